//! Progress and status reporting
//!
//! The orchestrator writes a fractional progress value and a short status
//! line to a [`ProgressSink`]. [`SharedProgress`] keeps both readable at any
//! time; [`ChannelSink`] forwards them as events.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};

/// Longest status line rendered as-is
pub const STATUS_MAX_CHARS: usize = 95;

/// Characters kept before the ellipsis when a status line is cut
const STATUS_KEEP_CHARS: usize = 92;

/// Status shown when no batch is running
pub const STATUS_IDLE: &str = "Idle";

/// Receiver of progress and status updates
pub trait ProgressSink: Send + Sync {
    /// Set overall batch progress in [0.0, 1.0]
    fn set_progress(&self, value: f64);

    /// Set the current human-readable status line
    fn set_status(&self, text: &str);

    /// Return progress to zero at the start of a batch
    fn reset(&self) {
        self.set_progress(0.0);
    }
}

/// Crop a status line for fixed-width display.
///
/// Lines longer than 95 characters become their first 92 characters
/// followed by `...`.
pub fn truncate_status(text: &str) -> String {
    if text.chars().count() > STATUS_MAX_CHARS {
        let kept: String = text.chars().take(STATUS_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

#[derive(Debug)]
struct ProgressInner {
    /// f64 bits of the current progress value
    progress: AtomicU64,
    status: Mutex<String>,
}

/// Progress state readable from any thread
///
/// Progress never moves backwards between [`ProgressSink::reset`] calls,
/// even with several writers.
#[derive(Debug, Clone)]
pub struct SharedProgress {
    inner: Arc<ProgressInner>,
}

impl Default for SharedProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedProgress {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                progress: AtomicU64::new(0.0f64.to_bits()),
                status: Mutex::new(STATUS_IDLE.to_string()),
            }),
        }
    }

    /// Current progress in [0.0, 1.0]
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.inner.progress.load(Ordering::SeqCst))
    }

    /// Current status text, uncropped
    pub fn status(&self) -> String {
        self.inner
            .status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current status text, cropped for display
    pub fn display_status(&self) -> String {
        truncate_status(&self.status())
    }
}

impl ProgressSink for SharedProgress {
    fn set_progress(&self, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        // Keep the larger of the stored and new value
        let _ = self
            .inner
            .progress
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                (value > f64::from_bits(bits)).then_some(value.to_bits())
            });
    }

    fn set_status(&self, text: &str) {
        *self.inner.status.lock().unwrap_or_else(|e| e.into_inner()) = text.to_string();
    }

    fn reset(&self) {
        self.inner.progress.store(0.0f64.to_bits(), Ordering::SeqCst);
    }
}

/// Event forwarded by [`ChannelSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress(f64),
    Status(String),
}

/// Forwards updates over a channel. Send errors (receiver gone) are ignored.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Mutex<mpsc::Sender<ProgressEvent>>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Mutex::new(tx) }, rx)
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .send(event);
    }
}

impl ProgressSink for ChannelSink {
    fn set_progress(&self, value: f64) {
        self.send(ProgressEvent::Progress(value));
    }

    fn set_status(&self, text: &str) {
        self.send(ProgressEvent::Status(text.to_string()));
    }
}

/// Fan updates out to several sinks
impl<A: ProgressSink, B: ProgressSink> ProgressSink for (A, B) {
    fn set_progress(&self, value: f64) {
        self.0.set_progress(value);
        self.1.set_progress(value);
    }

    fn set_status(&self, text: &str) {
        self.0.set_status(text);
        self.1.set_status(text);
    }

    fn reset(&self) {
        self.0.reset();
        self.1.reset();
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn set_progress(&self, _value: f64) {}
    fn set_status(&self, _text: &str) {}
}
