//! Query Classifier
//!
//! Decides whether a query asks for a stock price. The decision is delegated
//! to the language model: it is offered one function whose arguments carry
//! {company_symbol, intent} and either proposes a call or answers in text.

use crate::error::AssistantError;
use crate::llm::{FunctionDeclaration, GenerateRequest, LanguageModel, ModelReply};
use crate::models::{ClassificationResult, StockQuery, NIL};
use crate::Result;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub const CLASSIFIER_FUNCTION: &str = "get_company_symbol";

const CLASSIFIER_DESCRIPTION: &str = r#"Given a sentence, first find out whether it is asking for a stock price or not.
If not, set 'company_symbol' to 'NIL' and 'intent' to 'NIL'.

Use the ticker symbol for a company name, for example:
1) Apple - 'AAPL'
2) McDonald's - 'MCD'
3) Nike - 'NKE'
4) Starbucks - 'SBUX'"#;

/// The single capability offered to the model
pub fn classifier_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: CLASSIFIER_FUNCTION.to_string(),
        description: CLASSIFIER_DESCRIPTION.to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "company_symbol": {
                    "type": "STRING",
                    "description": "Ticker symbol of the company mentioned in the sentence, otherwise 'NIL'."
                },
                "intent": {
                    "type": "STRING",
                    "description": "'get_stock_info' if the sentence asks for stock information, otherwise 'NIL'."
                }
            },
            "required": ["company_symbol", "intent"]
        }),
    }
}

pub struct QueryClassifier {
    model: Arc<dyn LanguageModel>,
}

impl QueryClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Raw classification: the proposed call's arguments, or NIL/NIL for text
    pub async fn classify_raw(&self, query: &str) -> Result<ClassificationResult> {
        let request = GenerateRequest::with_function(query, classifier_declaration());

        match self.model.generate(&request).await? {
            ModelReply::FunctionCall { name, args } => {
                if name != CLASSIFIER_FUNCTION {
                    warn!(function = %name, "Model proposed an unexpected function");
                }
                serde_json::from_value(args).map_err(|e| {
                    AssistantError::MalformedClassification(format!(
                        "invalid call arguments: {}",
                        e
                    ))
                })
            }
            ModelReply::Text(_) => Ok(ClassificationResult::nil()),
        }
    }

    /// Classify a query; `None` means answer it as a general question
    pub async fn classify(&self, query: &str) -> Result<Option<StockQuery>> {
        let raw = self.classify_raw(query).await?;

        if !raw.is_stock_request() && !raw.company_symbol.eq_ignore_ascii_case(NIL) {
            warn!(
                symbol = %raw.company_symbol,
                intent = %raw.intent,
                "Partial classification, treating as general query"
            );
        }

        let routed = raw.into_stock_query()?;
        info!(stock_query = ?routed, "Query classified");
        Ok(routed)
    }
}
