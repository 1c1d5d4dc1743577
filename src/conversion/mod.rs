//! Audio conversion module
//!
//! Runs decoded audio through resampling and quantization, writes WAV
//! output, and orchestrates whole batches with progress reporting.

mod batch;
mod encoder;
mod parallel;
mod pipeline;
mod progress;

pub use batch::{BatchJob, BatchState, ConversionOutcome, Converter};
pub use encoder::{output_path, write_wav, BITS_PER_SAMPLE, OUTPUT_EXTENSION};
pub use parallel::{calculate_worker_count, convert_parallel};
pub use pipeline::{FilePipeline, Stage, STEPS_PER_FILE};
pub use progress::{
    truncate_status, ChannelSink, NullSink, ProgressEvent, ProgressSink, SharedProgress,
    STATUS_IDLE, STATUS_MAX_CHARS,
};
