//! Per-file conversion pipeline
//!
//! `Classify -> Decode -> Resample (optional) -> Quantize -> Encode`. Any
//! stage error ends the file; nothing is written under the final name
//! unless encoding completes.

use std::path::{Path, PathBuf};

use super::encoder::{output_path, write_wav};
use crate::audio::{
    decoder_for, needs_resample, quantize, resample, Classifier, MediaFormat,
};
use crate::error::{ClassificationError, ConvertError};

/// Pipeline stage about to start, reported with its status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Classification and decoding
    Decode,
    Resample,
    /// Quantization into output frames
    Assemble,
    /// Writing the output file
    Write,
}

impl Stage {
    /// Progress increments that precede this stage within one file
    pub fn steps_before(self) -> Option<usize> {
        match self {
            Stage::Decode => Some(0),
            Stage::Resample => Some(1),
            Stage::Assemble => Some(2),
            Stage::Write => None,
        }
    }
}

/// Progress increments reserved per file
pub const STEPS_PER_FILE: usize = 3;

/// Settings shared by every file of a batch
pub struct FilePipeline<'a> {
    classifier: &'a dyn Classifier,
    output_dir: &'a Path,
    target_rate: u32,
}

impl<'a> FilePipeline<'a> {
    pub fn new(classifier: &'a dyn Classifier, output_dir: &'a Path, target_rate: u32) -> Self {
        Self {
            classifier,
            output_dir,
            target_rate,
        }
    }

    /// Convert one file, calling `on_stage` before each major stage.
    ///
    /// Returns the path of the written output file.
    pub fn run<F>(&self, input: &Path, mut on_stage: F) -> Result<PathBuf, ConvertError>
    where
        F: FnMut(Stage, &str),
    {
        on_stage(Stage::Decode, &format!("Decoding {}", input.display()));

        let media_type = self.classifier.classify(input)?;
        let format = MediaFormat::from_media_type(&media_type);
        let decoder = decoder_for(format).ok_or(ClassificationError::Unsupported(media_type))?;
        let track = decoder.decode(input)?;
        log::debug!(
            "{}: {}, {} Hz, {:?}, {} frames ({:.2} s)",
            input.display(),
            format.media_type(),
            track.sample_rate(),
            track.channels(),
            track.frames(),
            track.duration_secs()
        );

        on_stage(Stage::Resample, &format!("Resampling {}", input.display()));

        let target = self.target_rate as f64;
        let channels = track.channels();
        let samples = if needs_resample(track.sample_rate(), target) {
            resample(track.samples(), target / track.sample_rate(), channels.count())?
        } else {
            track.into_samples()
        };

        on_stage(Stage::Assemble, "Assembling wave samples");

        let pcm = quantize(&samples);
        drop(samples);

        let destination = output_path(self.output_dir, input)?;
        on_stage(Stage::Write, &format!("Writing {}", destination.display()));

        write_wav(&destination, &pcm, channels, self.target_rate)?;
        Ok(destination)
    }
}
