//! Float to 16-bit fixed-point conversion
//!
//! Samples are consumed in pairs to form output frames. Conversion scales
//! positive values by 32767 and negative values by 32768, truncates toward
//! zero and saturates to the i16 range. The arithmetic is done in f64 with
//! no rounding-mode dependence, so results are identical on every platform.

/// One output frame: left and right (or two consecutive mono samples)
pub type Frame = [i16; 2];

/// Quantized output of one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedPcm {
    frames: Vec<Frame>,
    /// The final frame's second slot was synthesized (odd input length)
    padded: bool,
}

impl QuantizedPcm {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_padded(&self) -> bool {
        self.padded
    }

    /// Number of real (non-synthesized) samples
    pub fn sample_count(&self) -> usize {
        self.frames.len() * 2 - usize::from(self.padded)
    }

    /// Real samples in their original order
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.frames
            .iter()
            .flat_map(|frame| frame.iter().copied())
            .take(self.sample_count())
    }
}

/// Convert one normalized sample, saturating out-of-range input
pub fn quantize_sample(value: f32) -> i16 {
    let value = value as f64;
    let scaled = if value < 0.0 {
        value * 32768.0
    } else {
        value * 32767.0
    };
    // `as` truncates toward zero, saturates at the i32 bounds and maps NaN to 0
    (scaled as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Quantize interleaved samples into frames of two.
///
/// An odd-length input gets a synthesized 0 as the last frame's second value.
pub fn quantize(samples: &[f32]) -> QuantizedPcm {
    let mut frames = Vec::with_capacity(samples.len().div_ceil(2));
    for pair in samples.chunks(2) {
        let left = quantize_sample(pair[0]);
        let right = pair.get(1).map_or(0, |&v| quantize_sample(v));
        frames.push([left, right]);
    }

    QuantizedPcm {
        frames,
        padded: samples.len() % 2 == 1,
    }
}
