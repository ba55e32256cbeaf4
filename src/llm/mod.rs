//! Language model abstraction
//!
//! The pipeline talks to the hosted model through `LanguageModel` so the
//! classifier and the answer step can run against stubs in tests.

use crate::error::AssistantError;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod gemini;
pub use gemini::GeminiClient;

/// A callable capability the model may propose instead of answering in text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// OpenAPI-style schema of the arguments
    pub parameters: Value,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub contents: String,
    pub function: Option<FunctionDeclaration>,
}

impl GenerateRequest {
    pub fn text(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            function: None,
        }
    }

    pub fn with_function(contents: impl Into<String>, function: FunctionDeclaration) -> Self {
        Self {
            contents: contents.into(),
            function: Some(function),
        }
    }
}

/// First content part of the first candidate
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    FunctionCall { name: String, args: Value },
}

/// Trait for hosted language models.
///
/// Proposed function calls are returned to the caller, never executed.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<ModelReply>;

    /// Plain completion, no capabilities declared
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        match self.generate(&GenerateRequest::text(prompt)).await? {
            ModelReply::Text(text) => Ok(text),
            ModelReply::FunctionCall { name, .. } => Err(AssistantError::LlmError(format!(
                "expected a text answer, model proposed a call to '{}'",
                name
            ))),
        }
    }
}
