//! Structured progress reporting for index runs.
//!
//! The indexer reports every sub-page and database entry it visits, so a
//! front end can show a live "Indexed pages: N" counter.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted while walking a page tree.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the walk: "page", "database" or "fetch"
    pub phase: String,

    /// Pages visited so far
    pub current: u64,

    /// Human-readable message
    pub message: String,

    /// Elapsed time since the reporter was created
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    pub fn new(phase: impl Into<String>, current: u64, message: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            current,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        format!("[{}] {} - {}", self.phase, self.current, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Arc<Instant>,
}

impl ProgressReporter {
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Create a no-op reporter (no events emitted).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Arc::new(Instant::now()),
        }
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let event_with_time = event.with_elapsed(elapsed);

            tracing::debug!(
                phase = %event_with_time.phase,
                current = event_with_time.current,
                message = %event_with_time.message,
                elapsed_secs = elapsed,
                "Progress event"
            );

            callback(event_with_time);
        }
    }

    /// A sub-page or database entry was reached; `visited` is the new total.
    pub fn page(&self, visited: u64, title: &str) {
        self.emit(ProgressEvent::new("page", visited, title));
    }

    /// An embedded database is about to be queried.
    pub fn database(&self, visited: u64, title: &str) {
        self.emit(ProgressEvent::new(
            "database",
            visited,
            format!("querying {}", title),
        ));
    }

    /// A batch of block children arrived.
    pub fn fetch(&self, visited: u64, block_id: &str, batch_len: usize) {
        self.emit(ProgressEvent::new(
            "fetch",
            visited,
            format!("{} blocks under {}", batch_len, block_id),
        ));
    }
}
