//! Application-level plumbing around the converter
//!
//! This module contains:
//! - Persisted settings (output rate, output directory, worker count)
//! - Input discovery for files and directories

mod scanning;
mod settings;

pub use scanning::{collect_inputs, scan_directory};
pub use settings::{SampleRate, Settings};
