//! Core data models for the assistant
//!
//! Every value here lives for a single request.

use crate::error::AssistantError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intent tag the classifier emits for stock price questions
pub const STOCK_INTENT: &str = "get_stock_info";

/// Placeholder the classifier uses for "not applicable"
pub const NIL: &str = "NIL";

fn nil() -> String {
    NIL.to_string()
}

//
// ================= Classification =================
//

/// Raw arguments of the classifier's structured call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(default = "nil")]
    pub company_symbol: String,
    #[serde(default = "nil")]
    pub intent: String,
}

impl ClassificationResult {
    /// The "no stock intent" result
    pub fn nil() -> Self {
        Self {
            company_symbol: nil(),
            intent: nil(),
        }
    }

    pub fn is_stock_request(&self) -> bool {
        self.intent.trim() == STOCK_INTENT
    }

    /// Resolve the raw pair into a routed request.
    ///
    /// Anything other than the stock intent routes to a general answer, even
    /// when a symbol is present. A stock intent without a usable symbol is an error.
    pub fn into_stock_query(self) -> Result<Option<StockQuery>> {
        if !self.is_stock_request() {
            return Ok(None);
        }

        let symbol = self.company_symbol.trim();
        if symbol.is_empty() || symbol.eq_ignore_ascii_case(NIL) {
            return Err(AssistantError::MalformedClassification(format!(
                "intent '{}' without a company symbol",
                STOCK_INTENT
            )));
        }

        Ok(Some(StockQuery {
            symbol: symbol.to_uppercase(),
        }))
    }
}

/// A query routed to the market data provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuery {
    pub symbol: String,
}

//
// ================= Market Data =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
    pub currency: Option<String>,
}

/// Shortest exact rendering of the price, padded to at least two decimals.
/// Never rounds away digits the provider sent.
impl fmt::Display for PriceQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exact = self.price.to_string();
        match exact.split_once('.') {
            Some((_, decimals)) if decimals.len() >= 2 => f.write_str(&exact),
            _ => write!(f, "{:.2}", self.price),
        }
    }
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<PriceQuote>,
}
