//! Process configuration
//!
//! Secrets and tunables are read from the environment (after `.env` has been
//! loaded by the binary). Both API keys are required; startup fails without them.

use crate::error::AssistantError;
use crate::Result;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";
pub const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";
pub const DEFAULT_MARKET_DATA_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_PORT: u16 = 6000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub llm_api_key: String,
    pub llm_model: String,
    pub tts_api_key: String,
    pub voice_id: String,
    pub tts_model: String,
    pub output_format: String,
    pub market_data_url: String,
    pub host: String,
    pub port: u16,
    pub http_timeout: Duration,
}

impl AssistantConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key: &str| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm_api_key = get("GOOGLE_API_KEY")
            .or_else(|| get("GEMINI_API_KEY"))
            .ok_or_else(|| {
                AssistantError::Config(
                    "GOOGLE_API_KEY (or GEMINI_API_KEY) is not set".to_string(),
                )
            })?;

        let tts_api_key = get("ELEVENLABS_API_KEY").ok_or_else(|| {
            AssistantError::Config("ELEVENLABS_API_KEY is not set".to_string())
        })?;

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AssistantError::Config(format!("Invalid PORT '{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                AssistantError::Config(format!("Invalid HTTP_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            llm_api_key,
            llm_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tts_api_key,
            voice_id: get("ELEVENLABS_VOICE_ID").unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            tts_model: get("ELEVENLABS_MODEL_ID").unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            output_format: get("ELEVENLABS_OUTPUT_FORMAT")
                .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string()),
            market_data_url: get("MARKET_DATA_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_MARKET_DATA_URL.to_string()),
            host: "0.0.0.0".to_string(),
            port,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
