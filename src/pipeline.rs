//! Query pipeline
//!
//! CLASSIFY → (FETCH PRICE)? → COMPOSE PROMPT → GENERATE
//!
//! Every failure propagates to the caller; nothing is retried.

use crate::classifier::QueryClassifier;
use crate::llm::LanguageModel;
use crate::market::MarketData;
use crate::models::AgentResponse;
use crate::prompts::{finance_response_prompt, general_response_prompt};
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct Pipeline {
    classifier: QueryClassifier,
    model: Arc<dyn LanguageModel>,
    market: Arc<dyn MarketData>,
}

impl Pipeline {
    pub fn new(model: Arc<dyn LanguageModel>, market: Arc<dyn MarketData>) -> Self {
        Self {
            classifier: QueryClassifier::new(Arc::clone(&model)),
            model,
            market,
        }
    }

    /// Answer a single query
    pub async fn run(&self, query: &str) -> Result<AgentResponse> {
        let start = Instant::now();

        let (prompt, quote) = match self.classifier.classify(query).await? {
            Some(stock) => {
                let quote = self.market.current_price(&stock.symbol).await?;
                info!(symbol = %stock.symbol, price = %quote, "Answering with live price");
                (finance_response_prompt(query, &quote), Some(quote))
            }
            None => {
                info!("Answering as general query");
                (general_response_prompt(query), None)
            }
        };

        debug!(%prompt, "Response prompt");
        let text = self.model.generate_text(&prompt).await?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline completed"
        );

        Ok(AgentResponse { text, quote })
    }
}
