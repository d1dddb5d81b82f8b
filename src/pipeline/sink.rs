//! Outbound sinks for progress updates and status lines

use crate::types::Progress;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Receives human-readable status lines. The pipeline only ever appends.
pub trait LogSink: Send + Sync {
    fn append(&self, line: String);
}

/// Receives `(completed, total)` updates after every copied entry.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl LogSink for mpsc::UnboundedSender<String> {
    fn append(&self, line: String) {
        // The receiver may be gone once the caller stops listening
        if self.send(line).is_err() {
            tracing::trace!("log receiver dropped");
        }
    }
}

impl ProgressSink for mpsc::UnboundedSender<Progress> {
    fn report(&self, progress: Progress) {
        if self.send(progress).is_err() {
            tracing::trace!("progress receiver dropped");
        }
    }
}

/// In-memory sink, handy for tests and for callers that render at the end.
#[derive(Debug, Default)]
pub struct MemorySink<T> {
    items: Mutex<Vec<T>>,
}

impl<T: Clone> MemorySink<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything received so far
    pub fn items(&self) -> Vec<T> {
        match self.items.lock() {
            Ok(items) => items.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn push(&self, item: T) {
        if let Ok(mut items) = self.items.lock() {
            items.push(item);
        }
    }
}

impl LogSink for MemorySink<String> {
    fn append(&self, line: String) {
        self.push(line);
    }
}

impl ProgressSink for MemorySink<Progress> {
    fn report(&self, progress: Progress) {
        self.push(progress);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn append(&self, _line: String) {}
}

impl ProgressSink for NullSink {
    fn report(&self, _progress: Progress) {}
}
