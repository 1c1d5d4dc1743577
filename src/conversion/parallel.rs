//! Parallel batch conversion using tokio
//!
//! Converts the files of one batch concurrently on a blocking worker pool
//! sized based on CPU cores.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use super::batch::{finish_batch, BatchJob, ConversionOutcome, Converter, FileSteps, StepCounter};
use super::pipeline::FilePipeline;
use super::progress::ProgressSink;
use crate::error::Result;

/// Calculate the default number of parallel workers based on CPU cores
pub fn calculate_worker_count() -> usize {
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    // Use 75% of cores, clamped between 2 and 8
    ((available as f32 * 0.75).ceil() as usize).clamp(2, 8)
}

/// Convert a batch with up to `workers` files in flight.
///
/// Same contract as [`Converter::convert`], except that
/// [`ConversionOutcome::failed`] lists failures in completion order.
///
/// Dropping the returned future stops new files from starting. The
/// converter stays busy until every worker already started has finished.
pub async fn convert_parallel(
    converter: &Converter,
    job: BatchJob,
    sink: Arc<dyn ProgressSink>,
    workers: usize,
) -> Result<ConversionOutcome> {
    // Shared with every worker; the last holder returns the converter to idle
    let guard = Arc::new(converter.begin()?);
    sink.reset();

    let BatchJob {
        files,
        output_dir,
        sample_rate,
    } = job;

    let mut outcome = ConversionOutcome::default();
    if files.is_empty() {
        log::info!("Nothing to convert");
        finish_batch(sink.as_ref());
        return Ok(outcome);
    }

    let worker_count = workers.max(1);
    log::info!(
        "Starting parallel conversion: {} files with {} workers",
        files.len(),
        worker_count
    );

    let semaphore = Arc::new(Semaphore::new(worker_count));
    let counter = Arc::new(StepCounter::new(files.len()));
    let output_dir = Arc::new(output_dir);

    // Use FuturesUnordered to process completions as they happen
    let mut futures = FuturesUnordered::new();

    for file in files {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let classifier = converter.classifier();
        let counter = counter.clone();
        let sink = sink.clone();
        let output_dir = output_dir.clone();
        let input = file.clone();
        let guard = guard.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let pipeline = FilePipeline::new(classifier.as_ref(), &output_dir, sample_rate);
            let mut steps = FileSteps::new(&counter, sink.as_ref());
            let result = pipeline.run(&input, |stage, status| steps.stage(stage, status));
            steps.finish();
            drop(permit);
            drop(guard);
            result
        });

        futures.push(async move { (file, handle.await) });
    }

    while let Some((file, joined)) = futures.next().await {
        match joined {
            Ok(Ok(written)) => {
                log::info!("Converted {} -> {}", file.display(), written.display());
                outcome.written.push(written);
            }
            Ok(Err(e)) => {
                log::warn!("Failed to convert {}: {}", file.display(), e);
                outcome.failed.push(file);
            }
            Err(e) => {
                log::error!("Worker for {} did not finish: {}", file.display(), e);
                outcome.failed.push(file);
            }
        }
    }

    log::info!(
        "Parallel batch complete: {} converted, {} failed",
        outcome.written.len(),
        outcome.failed.len()
    );
    finish_batch(sink.as_ref());
    drop(guard);
    Ok(outcome)
}
