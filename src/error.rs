//! Error types for the stock voice assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Startup
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // Pipeline Errors
    // =============================

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Malformed classification: {0}")]
    MalformedClassification(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No current price available for {0}")]
    PriceUnavailable(String),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Speech synthesis error: {0}")]
    SpeechError(String),

    #[error("Audio playback error: {0}")]
    AudioError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
