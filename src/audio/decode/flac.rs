//! FLAC decoding

use std::path::Path;

use super::{decode_packets, Decoder};
use crate::audio::track::{ChannelLayout, Track};
use crate::error::DecodeError;

/// Rate reported for a stream that contains no frames
const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Decodes FLAC frame by frame.
///
/// Each frame's samples are normalized by `2^(bits_per_sample - 1)`. The
/// codec hands frames over left-justified in 32 bits, so full-scale float
/// conversion is that same division. The track is stereo if any frame
/// carried a second channel, and its rate is the rate of the last frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlacDecoder;

impl Decoder for FlacDecoder {
    fn decode(&self, path: &Path) -> Result<Track, DecodeError> {
        let mut samples: Vec<f32> = Vec::new();
        let mut sample_rate = FALLBACK_SAMPLE_RATE;
        let mut dual_channel = false;

        decode_packets::<f32, _>(path, "flac", |chunk, _| {
            for frame in chunk.frames() {
                samples.push(frame[0]);
                if let Some(&right) = frame.get(1) {
                    samples.push(right);
                    dual_channel = true;
                }
            }
            sample_rate = chunk.rate;
            Ok(())
        })?;

        let layout = if dual_channel {
            ChannelLayout::Stereo
        } else {
            ChannelLayout::Mono
        };

        log::debug!(
            "Decoded FLAC {}: {} samples, {:?} at {} Hz",
            path.display(),
            samples.len(),
            layout,
            sample_rate
        );

        Ok(Track::new(samples, sample_rate as f64, layout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{write_flac, FlacFixture};
    use tempfile::TempDir;

    #[test]
    fn test_decodes_stereo_16_bit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.flac");
        let left = vec![0i32, 16384, -16384, 32767];
        let right = vec![-32768i32, 8192, 0, 1];
        write_flac(&path, &FlacFixture {
            sample_rate: 44100,
            bits_per_sample: 16,
            channels: vec![left, right],
            block_size: 0,
        })
        .unwrap();

        let track = FlacDecoder.decode(&path).unwrap();
        assert_eq!(track.channels(), ChannelLayout::Stereo);
        assert_eq!(track.sample_rate(), 44100.0);
        assert_eq!(
            track.samples(),
            &[0.0, -1.0, 0.5, 0.25, -0.5, 0.0, 32767.0 / 32768.0, 1.0 / 32768.0]
        );
    }

    #[test]
    fn test_decodes_mono_24_bit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mono.flac");
        write_flac(&path, &FlacFixture {
            sample_rate: 48000,
            bits_per_sample: 24,
            channels: vec![vec![4_194_304, -8_388_608, 0]],
            block_size: 0,
        })
        .unwrap();

        let track = FlacDecoder.decode(&path).unwrap();
        assert_eq!(track.channels(), ChannelLayout::Mono);
        assert_eq!(track.sample_rate(), 48000.0);
        assert_eq!(track.samples(), &[0.5, -1.0, 0.0]);
    }

    #[test]
    fn test_samples_stay_in_order_across_frames() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frames.flac");
        let left: Vec<i32> = (0..48).map(|i| i * 256).collect();
        let right: Vec<i32> = (0..48).map(|i| -i * 256).collect();
        write_flac(&path, &FlacFixture {
            sample_rate: 48000,
            bits_per_sample: 16,
            channels: vec![left.clone(), right.clone()],
            block_size: 16,
        })
        .unwrap();

        let track = FlacDecoder.decode(&path).unwrap();
        assert_eq!(track.channels(), ChannelLayout::Stereo);
        assert_eq!(track.sample_rate(), 48000.0);
        assert_eq!(track.frames(), 48);

        let expected: Vec<f32> = left
            .iter()
            .zip(&right)
            .flat_map(|(&l, &r)| [l as f32 / 32768.0, r as f32 / 32768.0])
            .collect();
        assert_eq!(track.samples(), expected.as_slice());
    }

    #[test]
    fn test_truncated_stream_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cut.flac");
        // Signature and the start of a STREAMINFO block, then nothing
        std::fs::write(&path, b"fLaC\x80\x00\x00\x22\x10\x00").unwrap();

        assert!(FlacDecoder.decode(&path).is_err());
    }
}
