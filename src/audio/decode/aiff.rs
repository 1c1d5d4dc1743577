//! AIFF / AIFF-C decoding

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{decode_packets, Decoder};
use crate::audio::track::{ChannelLayout, Track};
use crate::error::DecodeError;

/// Decodes AIFF after checking the `FORM`/`AIFF` signature.
///
/// PCM arrives in chunks; samples are demultiplexed by position modulo the
/// declared channel count and only channels 0 and 1 are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct AiffDecoder;

impl AiffDecoder {
    fn validate(path: &Path) -> Result<(), DecodeError> {
        let mut header = [0u8; 12];
        let mut file = File::open(path)?;
        file.read_exact(&mut header).map_err(|e| DecodeError::InvalidContainer {
            format: "AIFF",
            reason: format!("short header: {}", e),
        })?;

        if &header[0..4] != b"FORM" {
            return Err(DecodeError::InvalidContainer {
                format: "AIFF",
                reason: "missing FORM chunk".to_string(),
            });
        }
        if &header[8..12] != b"AIFF" && &header[8..12] != b"AIFC" {
            return Err(DecodeError::InvalidContainer {
                format: "AIFF",
                reason: "FORM type is not AIFF or AIFC".to_string(),
            });
        }
        Ok(())
    }
}

impl Decoder for AiffDecoder {
    fn decode(&self, path: &Path) -> Result<Track, DecodeError> {
        Self::validate(path)?;

        let mut samples: Vec<f32> = Vec::new();
        // Position within the current frame, carried across chunks
        let mut channel = 0usize;

        let params = decode_packets::<f32, _>(path, "aiff", |chunk, params| {
            let declared = params
                .channels
                .map(|c| c.count())
                .unwrap_or(chunk.channels)
                .max(1);
            for &value in &chunk.samples {
                if channel < 2 {
                    samples.push(value);
                }
                channel = (channel + 1) % declared;
            }
            Ok(())
        })?;

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| DecodeError::Malformed("aiff COMM chunk has no sample rate".to_string()))?;
        let declared = params.channels.map(|c| c.count()).unwrap_or(1);

        Ok(Track::new(
            samples,
            sample_rate as f64,
            ChannelLayout::from_count(declared),
        ))
    }
}
