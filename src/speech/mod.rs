//! Speech output
//!
//! `Speaker` synthesizes an answer with ElevenLabs and plays it on the local
//! output device, resolving only after playback has finished.

use crate::error::AssistantError;
use crate::Result;
use async_trait::async_trait;
use tracing::info;

pub mod elevenlabs;
pub mod playback;

pub use elevenlabs::ElevenLabsTts;

/// Trait for turning text into audible speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

pub struct Speaker {
    tts: ElevenLabsTts,
}

impl Speaker {
    pub fn new(tts: ElevenLabsTts) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl SpeechSynthesizer for Speaker {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let audio = self.tts.synthesize(text).await?;
        info!(bytes = audio.len(), "Playing synthesized speech");

        tokio::task::spawn_blocking(move || playback::play_mp3(&audio))
            .await
            .map_err(|e| AssistantError::AudioError(format!("playback task failed: {}", e)))?
    }
}
