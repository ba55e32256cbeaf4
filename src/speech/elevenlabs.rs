//! ElevenLabs text-to-speech client

use crate::error::AssistantError;
use crate::Result;
use reqwest::{header, Client};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Synthesizes speech with a fixed voice, model and output format
pub struct ElevenLabsTts {
    client: Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    output_format: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsTts {
    pub fn new(
        api_key: String,
        voice_id: String,
        model_id: String,
        output_format: String,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(AssistantError::Config(
                "ElevenLabs API key required for TTS".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            voice_id,
            model_id,
            output_format,
            base_url: ELEVENLABS_BASE_URL.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url, self.voice_id, self.output_format
        )
    }

    /// Synthesize text to encoded audio bytes (MP3 for the default format)
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = TtsRequest {
            text,
            model_id: &self.model_id,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("ElevenLabs TTS error response ({}): {}", status, body);
            return Err(AssistantError::SpeechError(format!(
                "ElevenLabs TTS error {}: {}",
                status, body
            )));
        }

        let audio = response.bytes().await?;
        debug!(bytes = audio.len(), "Speech synthesized");
        Ok(audio.to_vec())
    }
}
