//! Batch orchestration
//!
//! A [`Converter`] runs one batch at a time. Each file goes through the
//! [`FilePipeline`]; a failing file is recorded and the batch moves on.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::pipeline::{FilePipeline, Stage, STEPS_PER_FILE};
use super::progress::{ProgressSink, STATUS_IDLE};
use crate::audio::{Classifier, ContentSniffer};
use crate::error::{ConvertError, Result};

/// Whether a batch is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Running,
}

/// Input of one batch run
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Files to convert, in order (duplicates allowed)
    pub files: Vec<PathBuf>,
    /// Directory receiving `<stem>.wav` outputs
    pub output_dir: PathBuf,
    /// Output sample rate in Hz, fixed for the whole batch
    pub sample_rate: u32,
}

/// Result of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Inputs that failed at any stage
    pub failed: Vec<PathBuf>,
    /// Output files written
    pub written: Vec<PathBuf>,
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Marks the converter busy; returns it to idle when dropped
pub(crate) struct BatchGuard {
    state: Arc<Mutex<BatchState>>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = BatchState::Idle;
    }
}

/// Counts completed progress increments across a batch.
///
/// Increments and the matching sink update happen under one lock, so the
/// values a sink sees never decrease, even from several workers.
pub(crate) struct StepCounter {
    done: Mutex<usize>,
    total: usize,
}

impl StepCounter {
    pub fn new(files: usize) -> Self {
        Self {
            done: Mutex::new(0),
            total: files * STEPS_PER_FILE,
        }
    }

    /// Advance by `steps` and publish the new fraction
    pub fn advance(&self, steps: usize, sink: &dyn ProgressSink) {
        let mut done = self.done.lock().unwrap_or_else(|e| e.into_inner());
        *done = (*done + steps).min(self.total);
        if self.total > 0 {
            sink.set_progress(*done as f64 / self.total as f64);
        }
    }
}

/// Tracks one file's share of the counter
pub(crate) struct FileSteps<'a> {
    counter: &'a StepCounter,
    sink: &'a dyn ProgressSink,
    taken: usize,
}

impl<'a> FileSteps<'a> {
    pub fn new(counter: &'a StepCounter, sink: &'a dyn ProgressSink) -> Self {
        Self {
            counter,
            sink,
            taken: 0,
        }
    }

    /// Report a stage: move progress to the stage's slot, then show its status
    pub fn stage(&mut self, stage: Stage, status: &str) {
        if let Some(before) = stage.steps_before() {
            let steps = before.saturating_sub(self.taken);
            self.taken += steps;
            self.counter.advance(steps, self.sink);
        }
        self.sink.set_status(status);
    }

    /// Consume whatever is left of this file's increments
    pub fn finish(mut self) {
        let rest = STEPS_PER_FILE - self.taken;
        self.taken = STEPS_PER_FILE;
        self.counter.advance(rest, self.sink);
    }
}

/// Runs conversion batches, one at a time
#[derive(Clone)]
pub struct Converter {
    state: Arc<Mutex<BatchState>>,
    classifier: Arc<dyn Classifier>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Converter that classifies files by content
    pub fn new() -> Self {
        Self::with_classifier(Arc::new(ContentSniffer))
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BatchState::Idle)),
            classifier,
        }
    }

    pub fn state(&self) -> BatchState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_running(&self) -> bool {
        self.state() == BatchState::Running
    }

    pub(crate) fn classifier(&self) -> Arc<dyn Classifier> {
        self.classifier.clone()
    }

    /// Move Idle -> Running, refusing if a batch is already in flight
    pub(crate) fn begin(&self) -> Result<BatchGuard> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == BatchState::Running {
            return Err(ConvertError::BatchInProgress);
        }
        *state = BatchState::Running;
        Ok(BatchGuard {
            state: self.state.clone(),
        })
    }

    /// Convert every file of `job` in order.
    ///
    /// Only fails with [`ConvertError::BatchInProgress`]; per-file errors are
    /// collected in [`ConversionOutcome::failed`] in input order.
    pub fn convert(&self, job: &BatchJob, sink: &dyn ProgressSink) -> Result<ConversionOutcome> {
        let _guard = self.begin()?;
        sink.reset();

        let mut outcome = ConversionOutcome::default();
        if job.files.is_empty() {
            log::info!("Nothing to convert");
            finish_batch(sink);
            return Ok(outcome);
        }

        log::info!(
            "Converting {} files to {} Hz into {}",
            job.files.len(),
            job.sample_rate,
            job.output_dir.display()
        );

        let pipeline = FilePipeline::new(self.classifier.as_ref(), &job.output_dir, job.sample_rate);
        let counter = StepCounter::new(job.files.len());

        for file in &job.files {
            let mut steps = FileSteps::new(&counter, sink);
            match pipeline.run(file, |stage, status| steps.stage(stage, status)) {
                Ok(written) => {
                    log::info!("Converted {} -> {}", file.display(), written.display());
                    outcome.written.push(written);
                }
                Err(e) => {
                    log::warn!("Failed to convert {}: {}", file.display(), e);
                    outcome.failed.push(file.clone());
                }
            }
            steps.finish();
        }

        log::info!(
            "Batch complete: {} converted, {} failed",
            outcome.written.len(),
            outcome.failed.len()
        );
        finish_batch(sink);
        Ok(outcome)
    }
}

/// Settle the sink in its terminal state
pub(crate) fn finish_batch(sink: &dyn ProgressSink) {
    sink.set_progress(1.0);
    sink.set_status(STATUS_IDLE);
}
