//! Stock Voice Assistant
//!
//! A conversational assistant that:
//! - Classifies each query with a hosted LLM (function calling)
//! - Looks up a live stock price when the query asks for one
//! - Composes the answer with the LLM
//! - Replies over a real-time channel, then speaks the answer aloud
//!
//! REQUEST FLOW:
//! MESSAGE → CLASSIFY → (PRICE)? → PROMPT → GENERATE → REPLY → SPEAK

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod llm;
pub mod market;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod speech;

#[cfg(test)]
mod testing;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::QueryClassifier;
pub use pipeline::Pipeline;
