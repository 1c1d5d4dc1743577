//! Sample rate conversion using rubato
//!
//! Offline, best-quality windowed-sinc conversion of a whole track. Output
//! may overshoot [-1.0, 1.0] from filter ringing; the quantizer saturates.

use rubato::{
    Resampler as RubatoResampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

use crate::error::ResampleError;

/// Input frames fed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Highest-quality sinc parameters rubato offers
fn best_quality_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Should a track at `source_rate` be resampled to `target_rate`?
///
/// Exact comparison: any difference at all triggers conversion.
pub fn needs_resample(source_rate: f64, target_rate: f64) -> bool {
    source_rate != target_rate
}

/// Resample interleaved `samples` by `ratio` (`target_rate / source_rate`).
///
/// Returns interleaved samples with the same channel count, trimmed to
/// `frames * ratio` frames (rounded) and aligned so the resampler's group delay
/// is removed.
pub fn resample(samples: &[f32], ratio: f64, channels: usize) -> Result<Vec<f32>, ResampleError> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ResampleError::InvalidRatio(ratio));
    }
    if channels == 0 || channels > 2 {
        return Err(ResampleError::UnsupportedChannels(channels));
    }

    let planar = deinterleave(samples, channels);
    let input_frames = planar[0].len();
    if input_frames == 0 {
        return Ok(Vec::new());
    }

    let expected_frames = (input_frames as f64 * ratio).round() as usize;

    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        1.0,
        best_quality_params(),
        CHUNK_FRAMES,
        channels,
    )?;

    let delay = resampler.output_delay();
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected_frames + delay); channels];

    let mut position = 0;
    while input_frames - position >= resampler.input_frames_next() {
        let needed = resampler.input_frames_next();
        let block: Vec<&[f32]> = planar
            .iter()
            .map(|ch| &ch[position..position + needed])
            .collect();
        append(&mut output, resampler.process(&block, None)?);
        position += needed;
    }

    if position < input_frames {
        let block: Vec<&[f32]> = planar.iter().map(|ch| &ch[position..]).collect();
        append(&mut output, resampler.process_partial(Some(block.as_slice()), None)?);
    }

    // Flush the filter tail until the delayed signal is fully out
    while output[0].len() < expected_frames + delay {
        let before = output[0].len();
        append(&mut output, resampler.process_partial::<&[f32]>(None, None)?);
        if output[0].len() == before {
            break;
        }
    }

    for ch in output.iter_mut() {
        let end = (delay + expected_frames).min(ch.len());
        let start = delay.min(end);
        ch.truncate(end);
        ch.drain(..start);
    }

    log::debug!(
        "Resampled {} frames to {} frames (ratio {:.6}, {} channels)",
        input_frames,
        output[0].len(),
        ratio,
        channels
    );

    Ok(interleave(&output))
}

fn append(output: &mut [Vec<f32>], block: Vec<Vec<f32>>) {
    for (out, ch) in output.iter_mut().zip(block) {
        out.extend_from_slice(&ch);
    }
}

/// Convert interleaved samples to planar format.
///
/// Input:  [L, R, L, R, ...]
/// Output: [[L, L, ...], [R, R, ...]]
fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    let frames = samples.len() / channels;
    let mut planar = vec![Vec::with_capacity(frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (ch, &value) in planar.iter_mut().zip(frame) {
            ch.push(value);
        }
    }
    planar
}

/// Convert planar samples back to interleaved format
fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = planar.first() else {
        return Vec::new();
    };
    let frames = first.len();
    let mut interleaved = Vec::with_capacity(frames * planar.len());
    for i in 0..frames {
        for ch in planar {
            interleaved.push(ch[i]);
        }
    }
    interleaved
}
