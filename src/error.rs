//! Error types for the conversion pipeline
//!
//! Each pipeline stage has its own error kind. All of them are recovered per
//! file by the batch orchestrator; none aborts a batch.

use std::path::PathBuf;
use thiserror::Error;

/// The input could not be read or sniffed
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported content type: {0}")]
    Unsupported(String),
}

/// The container or stream could not be turned into a track
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to open input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid {format} container: {reason}")]
    InvalidContainer { format: &'static str, reason: String },

    #[error("Unsupported stream: {0}")]
    Unsupported(String),

    #[error("Malformed stream: {0}")]
    Malformed(String),
}

impl From<symphonia::core::errors::Error> for DecodeError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error as SymphoniaError;

        match err {
            SymphoniaError::IoError(e) => DecodeError::Io(e),
            SymphoniaError::Unsupported(what) => DecodeError::Unsupported(what.to_string()),
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}

/// The rate conversion could not be performed
#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("Invalid resample ratio: {0}")]
    InvalidRatio(f64),

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("Resampler construction failed: {0}")]
    Construction(#[from] rubato::ResamplerConstructionError),

    #[error("Resampling failed: {0}")]
    Process(#[from] rubato::ResampleError),
}

/// The output file could not be created, written or published
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Output I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV writer error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Cannot derive an output name from {0}")]
    InvalidName(PathBuf),
}

/// Failure of a single file, or refusal to start a batch
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Classification error: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Resample error: {0}")]
    Resample(#[from] ResampleError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("A conversion batch is already running")]
    BatchInProgress,
}

/// Convenience Result type for pipeline operations
pub type Result<T> = std::result::Result<T, ConvertError>;
