//! Run-time state shared between the worker and its caller

use super::TreeCopyError;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag.
///
/// Clones share the same flag. The copy walk checks it before every
/// directory and file visit; a file copy in flight always finishes first.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress update: `completed` units out of `total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`; an empty run counts as done
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Terminal state of a copy run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CopyStatus {
    Succeeded,
    Cancelled,
    Failed,
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CopyStatus::Succeeded => "SUCCEEDED",
            CopyStatus::Cancelled => "CANCELLED",
            CopyStatus::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Outcome of one copy run. Produced once, never mutated afterwards.
#[derive(Debug)]
pub struct CopyResult {
    pub directories_copied: usize,
    pub files_copied: usize,
    /// Units of work finished when the walk stopped
    pub units_completed: u64,
    /// Units of work planned for the run
    pub total_work: u64,
    pub status: CopyStatus,
    /// Set only when `status` is `Failed`
    pub cause: Option<TreeCopyError>,
}

impl CopyResult {
    /// Result for a run that failed before the walk started
    pub fn failed(cause: TreeCopyError) -> Self {
        Self {
            directories_copied: 0,
            files_copied: 0,
            units_completed: 0,
            total_work: 0,
            status: CopyStatus::Failed,
            cause: Some(cause),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CopyStatus::Succeeded
    }
}
