//! pcmconv - batch audio conversion to 16-bit PCM WAV
//!
//! Decodes MP3, FLAC, WAV and AIFF input, resamples it to one target rate,
//! quantizes to 16-bit and writes one WAV file per input. Batches isolate
//! per-file failures and report progress through a [`conversion::ProgressSink`].

pub mod audio;
pub mod conversion;
pub mod core;
pub mod error;
pub mod logging;

#[cfg(test)]
mod test_fixtures;
