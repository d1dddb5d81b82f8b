//! Progress reporting

use crate::types::{CopyStatus, Progress};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for one copy run, plus the status log printed above it
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter drawing to stderr
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Reporter that draws nothing, for machine-readable output
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        if let Ok(style) =
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} entries | {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }

    /// Reset the bar for a run of `total` directories and files.
    pub fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_message("Copy in progress...".to_string());
    }

    /// Apply a `(completed, total)` update from the worker.
    pub fn update(&self, progress: Progress) {
        if self.bar.length() != Some(progress.total) {
            self.bar.set_length(progress.total);
        }
        self.bar.set_position(progress.completed);
        self.bar
            .set_message(format!("{:.0}%", progress.fraction() * 100.0));
    }

    /// Print one status line above the bar.
    pub fn log_line(&self, line: &str) {
        self.bar.println(line);
    }

    /// Finalize the bar with the run status.
    pub fn finish(&self, status: CopyStatus) {
        let label = match status {
            CopyStatus::Succeeded => style(status.to_string()).green().bold(),
            CopyStatus::Cancelled => style(status.to_string()).yellow().bold(),
            CopyStatus::Failed => style(status.to_string()).red().bold(),
        };
        match status {
            CopyStatus::Succeeded => self.bar.finish_with_message(label.to_string()),
            _ => self.bar.abandon_with_message(label.to_string()),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
