//! MPEG audio layer III decoding

use std::path::Path;

use super::{decode_packets, Decoder};
use crate::audio::track::{ChannelLayout, Track};
use crate::error::DecodeError;

/// Largest positive 16-bit magnitude, used as the normalization divisor
const I16_SCALE: f32 = i16::MAX as f32;

/// Decodes MP3 through signed 16-bit PCM.
///
/// Output is always stereo. Mono streams have their single channel copied
/// into both slots, which is what a 16-bit stereo MP3 decode produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp3Decoder;

impl Decoder for Mp3Decoder {
    fn decode(&self, path: &Path) -> Result<Track, DecodeError> {
        let mut samples: Vec<f32> = Vec::new();
        let mut sample_rate = 0u32;

        let params = decode_packets::<i16, _>(path, "mp3", |chunk, _| {
            sample_rate = chunk.rate;
            for frame in chunk.frames() {
                let left = frame[0];
                let right = frame.get(1).copied().unwrap_or(left);
                samples.push(left as f32 / I16_SCALE);
                samples.push(right as f32 / I16_SCALE);
            }
            Ok(())
        })?;

        if sample_rate == 0 {
            sample_rate = params
                .sample_rate
                .ok_or_else(|| DecodeError::Malformed("mp3 stream has no sample rate".to_string()))?;
        }

        log::debug!(
            "Decoded MP3 {}: {} frames at {} Hz",
            path.display(),
            samples.len() / 2,
            sample_rate
        );

        Ok(Track::new(samples, sample_rate as f64, ChannelLayout::Stereo))
    }
}
