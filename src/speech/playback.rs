//! Audio playback to the default output device
//!
//! Blocking: returns once the clip has finished playing. Call it from
//! `spawn_blocking` inside async code.

use crate::error::AssistantError;
use crate::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use std::io::Cursor;
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, error};

/// Used when the stream carries no frames
const FALLBACK_SAMPLE_RATE: u32 = 44_100;

/// Decoded mono clip
#[derive(Debug, Default)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Clip {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.samples.len() as u64 * 1000 / u64::from(self.sample_rate))
    }
}

/// Decode MP3 bytes and play them, blocking until done
pub fn play_mp3(mp3_data: &[u8]) -> Result<()> {
    let clip = decode_mp3(mp3_data)?;
    play_clip(clip)
}

/// Decode MP3 bytes to mono f32 samples
pub fn decode_mp3(mp3_data: &[u8]) -> Result<Clip> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate.get_or_insert(frame.sample_rate as u32);

                if frame.channels == 2 {
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        (left + right) / 2.0
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(AssistantError::AudioError(format!("MP3 decode error: {}", e))),
        }
    }

    Ok(Clip {
        samples,
        sample_rate: sample_rate.unwrap_or(FALLBACK_SAMPLE_RATE),
    })
}

fn play_clip(clip: Clip) -> Result<()> {
    if clip.samples.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AssistantError::AudioError("no output device available".to_string()))?;

    let rate = SampleRate(clip.sample_rate);
    let supported = device
        .supported_output_configs()
        .map_err(|e| AssistantError::AudioError(e.to_string()))?
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .filter(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
        .min_by_key(|c| c.channels())
        .ok_or_else(|| {
            AssistantError::AudioError(format!(
                "no output config supports {} Hz",
                clip.sample_rate
            ))
        })?;

    let config: StreamConfig = supported.with_sample_rate(rate).config();
    let channels = config.channels as usize;
    let timeout = clip.duration() + Duration::from_secs(2);

    let (done_tx, done_rx) = mpsc::channel();
    let mut done_tx = Some(done_tx);
    let samples = clip.samples;
    let total = samples.len();
    let mut position = 0usize;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = samples.get(position).copied().unwrap_or(0.0);
                    frame.iter_mut().for_each(|out| *out = sample);
                    position += 1;
                }
                if position >= samples.len() {
                    if let Some(tx) = done_tx.take() {
                        let _ = tx.send(());
                    }
                }
            },
            |err| error!(error = %err, "audio playback error"),
            None,
        )
        .map_err(|e| AssistantError::AudioError(e.to_string()))?;

    stream
        .play()
        .map_err(|e| AssistantError::AudioError(e.to_string()))?;

    if done_rx.recv_timeout(timeout).is_err() {
        return Err(AssistantError::AudioError(
            "playback did not finish in time".to_string(),
        ));
    }

    // Let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(100));
    drop(stream);
    debug!(samples = total, "Playback complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_decodes_to_empty_clip() {
        let clip = decode_mp3(&[]).unwrap();
        assert!(clip.samples.is_empty());
        assert_eq!(clip.sample_rate, FALLBACK_SAMPLE_RATE);
    }

    #[test]
    fn test_empty_clip_skips_device() {
        assert!(play_mp3(&[]).is_ok());
    }

    #[test]
    fn test_clip_duration() {
        let clip = Clip {
            samples: vec![0.0; 44_100],
            sample_rate: 44_100,
        };
        assert_eq!(clip.duration(), Duration::from_secs(1));
        assert_eq!(Clip::default().duration(), Duration::ZERO);
    }
}
