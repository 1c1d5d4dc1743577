//! pcmconv - command line front end
//!
//! Converts the given files and directories to 16-bit WAV in the output
//! directory, printing progress to stderr and the failure list at the end.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;

use pcmconv::audio::ContentSniffer;
use pcmconv::conversion::{
    calculate_worker_count, convert_parallel, BatchJob, ConversionOutcome,
    Converter, ProgressSink, SharedProgress,
};
use pcmconv::core::{collect_inputs, SampleRate, Settings};
use pcmconv::error::ConvertError;
use pcmconv::logging;

#[derive(Parser, Debug)]
#[command(name = "pcmconv", version, about = "Convert MP3, FLAC, WAV and AIFF files to 16-bit WAV")]
struct Cli {
    /// Files or directories to convert (directories are searched recursively)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for converted files [default: saved setting, else home]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output sample rate in Hz, e.g. 44100 or 48000 [default: saved setting, else 48000]
    #[arg(short = 'r', long)]
    sample_rate: Option<SampleRate>,

    /// Files converted at once; 0 picks a count from the CPU cores [default: saved setting, else 1]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Store the effective options as the new defaults
    #[arg(long)]
    save_settings: bool,

    /// Show debug output in the terminal
    #[arg(short, long)]
    verbose: bool,
}

/// Prints a line to stderr whenever the status changes
struct TerminalSink {
    progress: SharedProgress,
    last_status: Mutex<String>,
}

impl TerminalSink {
    fn new() -> Self {
        Self {
            progress: SharedProgress::new(),
            last_status: Mutex::new(String::new()),
        }
    }
}

impl ProgressSink for TerminalSink {
    fn set_progress(&self, value: f64) {
        self.progress.set_progress(value);
    }

    fn set_status(&self, text: &str) {
        self.progress.set_status(text);
        let mut last = self.last_status.lock().unwrap_or_else(|e| e.into_inner());
        if *last != text {
            eprintln!(
                "[{:>3.0}%] {}",
                self.progress.progress() * 100.0,
                self.progress.display_status()
            );
            *last = text.to_string();
        }
    }

    fn reset(&self) {
        self.progress.reset();
    }
}

fn apply_options(cli: &Cli, settings: &mut Settings) {
    if let Some(dir) = &cli.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(rate) = cli.sample_rate {
        settings.sample_rate = rate;
    }
    if let Some(jobs) = cli.jobs {
        settings.jobs = jobs;
    }
}

fn run_batch(
    converter: &Converter,
    job: BatchJob,
    jobs: usize,
) -> Result<ConversionOutcome, String> {
    let sink = Arc::new(TerminalSink::new());

    if jobs == 1 {
        return converter
            .convert(&job, sink.as_ref())
            .map_err(|e: ConvertError| e.to_string());
    }

    let workers = if jobs == 0 { calculate_worker_count() } else { jobs };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start worker pool: {}", e))?;

    runtime
        .block_on(convert_parallel(converter, job, sink, workers))
        .map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let mut settings = Settings::load();
    apply_options(&cli, &mut settings);

    if cli.save_settings {
        match settings.save() {
            Ok(path) => log::info!("Saved settings to {}", path.display()),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }

    if !settings.sample_rate.is_preset() {
        log::info!(
            "{} is not one of the usual output rates ({} or {})",
            settings.sample_rate,
            SampleRate::PRESETS[0],
            SampleRate::PRESETS[1]
        );
    }

    if !settings.output_dir.is_dir() {
        eprintln!(
            "Output directory does not exist: {}",
            settings.output_dir.display()
        );
        return ExitCode::from(2);
    }

    let files = match collect_inputs(&cli.inputs, &ContentSniffer) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let total = files.len();

    let job = BatchJob {
        files,
        output_dir: settings.output_dir.clone(),
        sample_rate: settings.sample_rate.hz(),
    };

    let outcome = match run_batch(&Converter::new(), job, settings.jobs) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    println!(
        "Converted {} of {} files into {}",
        outcome.written.len(),
        total,
        settings.output_dir.display()
    );

    if outcome.is_success() {
        return ExitCode::SUCCESS;
    }

    println!("Failed to convert:");
    for file in &outcome.failed {
        println!("  {}", file.display());
    }
    ExitCode::FAILURE
}
