//! Canonical decoded audio
//!
//! Every decoder produces a [`Track`] and every later stage consumes one.
//! Samples are normalized floats, interleaved by channel.

/// Channel layout of a decoded track. Sources with more than two channels
/// are reduced to their first two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// Layout for a source channel count (anything above one is stereo)
    pub fn from_count(count: usize) -> Self {
        if count <= 1 { Self::Mono } else { Self::Stereo }
    }

    pub fn count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// A fully decoded audio file
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    samples: Vec<f32>,
    sample_rate: f64,
    channels: ChannelLayout,
}

impl Track {
    /// Build a track, dropping any trailing partial frame so that the sample
    /// count is always a multiple of the channel count.
    pub fn new(mut samples: Vec<f32>, sample_rate: f64, channels: ChannelLayout) -> Self {
        let whole = samples.len() - samples.len() % channels.count();
        samples.truncate(whole);
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Interleaved, normalized samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Source sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> ChannelLayout {
        self.channels
    }

    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.count()
    }

    /// Duration in seconds, zero for a track without a usable rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.frames() as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
