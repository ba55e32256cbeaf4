//! Recording stubs for the external services

use crate::error::AssistantError;
use crate::llm::{GenerateRequest, LanguageModel, ModelReply};
use crate::market::MarketData;
use crate::models::PriceQuote;
use crate::speech::SpeechSynthesizer;
use crate::Result;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered log of what the stubs observed
pub type Timeline = Arc<Mutex<Vec<String>>>;

/// Language model stub: answers classification requests with `classification`
/// and plain requests with `answer`, recording every prompt.
pub struct StubModel {
    classification: Option<(String, String)>,
    answer: String,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl StubModel {
    /// Classifier replies with plain text (no structured call)
    pub fn plain(answer: &str) -> Self {
        Self {
            classification: None,
            answer: answer.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Classifier proposes a call with the given arguments
    pub fn calling(symbol: &str, intent: &str, answer: &str) -> Self {
        Self {
            classification: Some((symbol.to_string(), intent.to_string())),
            answer: answer.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.contents.clone())
            .collect()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(request.clone());

        match (&request.function, &self.classification) {
            (Some(declaration), Some((symbol, intent))) => Ok(ModelReply::FunctionCall {
                name: declaration.name.clone(),
                args: json!({ "company_symbol": symbol, "intent": intent }),
            }),
            (Some(_), None) => Ok(ModelReply::Text("I can help with that.".to_string())),
            (None, _) => Ok(ModelReply::Text(self.answer.clone())),
        }
    }
}

/// Language model stub that always fails
pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn generate(&self, _request: &GenerateRequest) -> Result<ModelReply> {
        Err(AssistantError::LlmError("401 Unauthorized".to_string()))
    }
}

/// Market data stub with fixed prices; unknown symbols fail
#[derive(Default)]
pub struct StubMarket {
    prices: HashMap<String, f64>,
    pub lookups: Mutex<Vec<String>>,
}

impl StubMarket {
    pub fn with_price(symbol: &str, price: f64) -> Self {
        let mut prices = HashMap::new();
        prices.insert(symbol.to_string(), price);
        Self {
            prices,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketData for StubMarket {
    async fn current_price(&self, symbol: &str) -> Result<PriceQuote> {
        self.lookups.lock().unwrap().push(symbol.to_string());

        self.prices
            .get(symbol)
            .map(|price| PriceQuote {
                symbol: symbol.to_string(),
                price: *price,
                currency: Some("USD".to_string()),
            })
            .ok_or_else(|| AssistantError::SymbolNotFound(symbol.to_string()))
    }
}

/// Speech stub that writes `speak:<text>` to a timeline
pub struct RecordingSpeaker {
    timeline: Timeline,
    fail: bool,
}

impl RecordingSpeaker {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            fail: false,
        }
    }

    pub fn failing(timeline: Timeline) -> Self {
        Self {
            timeline,
            fail: true,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        self.timeline.lock().unwrap().push(format!("speak:{}", text));
        if self.fail {
            return Err(AssistantError::AudioError("no output device".to_string()));
        }
        Ok(())
    }
}

/// Speech stub that takes a while to play and tracks how many plays overlap
#[derive(Default)]
pub struct SlowSpeaker {
    active: AtomicUsize,
    max_active: AtomicUsize,
    spoken: AtomicUsize,
}

impl SlowSpeaker {
    pub fn max_overlap(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn spoken(&self) -> usize {
        self.spoken.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for SlowSpeaker {
    async fn speak(&self, _text: &str) -> Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.spoken.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
