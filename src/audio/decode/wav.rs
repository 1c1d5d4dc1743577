//! RIFF/WAVE decoding

use std::path::Path;

use super::{decode_packets, Decoder};
use crate::audio::track::{ChannelLayout, Track};
use crate::error::DecodeError;

/// Decodes WAV using the rate and channel count from the `fmt ` header.
///
/// Mono files yield one sample per frame. Files with more than two channels
/// keep the first two. Sample conversion to float follows the container's
/// own bit depth (integer PCM is divided by `2^(bits - 1)`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl Decoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<Track, DecodeError> {
        let mut samples: Vec<f32> = Vec::new();

        let params = decode_packets::<f32, _>(path, "wav", |chunk, _| {
            for frame in chunk.frames() {
                samples.extend(frame.iter().take(2));
            }
            Ok(())
        })?;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| DecodeError::Malformed("wav header has no sample rate".to_string()))?;
        let declared = params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| DecodeError::Malformed("wav header has no channel count".to_string()))?;

        Ok(Track::new(
            samples,
            sample_rate as f64,
            ChannelLayout::from_count(declared),
        ))
    }
}
