//! Yahoo Finance market data client
//!
//! Reads instrument metadata from the chart endpoint and extracts
//! `regularMarketPrice`, the last trade price.

use super::MarketData;
use crate::error::AssistantError;
use crate::models::PriceQuote;
use crate::Result;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        )
    }
}

#[async_trait]
impl MarketData for YahooFinanceClient {
    async fn current_price(&self, symbol: &str) -> Result<PriceQuote> {
        if symbol.is_empty() || !symbol.chars().all(is_symbol_char) {
            return Err(AssistantError::SymbolNotFound(symbol.to_string()));
        }

        let response = self
            .client
            .get(self.chart_url(symbol))
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                AssistantError::MarketDataError(format!(
                    "Quote request failed for {}: {}",
                    symbol, e
                ))
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(symbol, "Unknown symbol");
            return Err(AssistantError::SymbolNotFound(symbol.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::MarketDataError(format!(
                "Market data provider returned {} for {}: {}",
                status, symbol, body
            )));
        }

        let chart: ChartResponse = response.json().await.map_err(|e| {
            AssistantError::MarketDataError(format!("Invalid quote response: {}", e))
        })?;

        let quote = quote_from_chart(symbol, chart)?;
        info!(symbol, price = quote.price, "Fetched current price");
        Ok(quote)
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '=' | '^')
}

fn quote_from_chart(symbol: &str, chart: ChartResponse) -> Result<PriceQuote> {
    if let Some(error) = chart.chart.error {
        warn!(symbol, code = ?error.code, "Market data provider rejected symbol");
        return Err(AssistantError::SymbolNotFound(symbol.to_string()));
    }

    let meta = chart
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|r| r.meta)
        .ok_or_else(|| AssistantError::SymbolNotFound(symbol.to_string()))?;

    let price = meta
        .regular_market_price
        .ok_or_else(|| AssistantError::PriceUnavailable(symbol.to_string()))?;

    Ok(PriceQuote {
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        price,
        currency: meta.currency,
    })
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    #[allow(dead_code)]
    description: Option<String>,
}
