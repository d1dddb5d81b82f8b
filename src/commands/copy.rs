//! Copy command: one filtered copy run driven from the terminal

use crate::executor::CopyOptions;
use crate::pipeline::{self, ArchiveOutcome, CopyRequest, PipelineHandle, PipelineOutcome};
use crate::types::{CopyStatus, SelectionSet, TreeCopyError};
use crate::ui::ProgressReporter;
use crate::Config;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Machine-readable summary of a finished run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub target: PathBuf,
    pub filters: String,
    pub status: CopyStatus,
    pub directories_copied: usize,
    pub files_copied: usize,
    pub units_completed: u64,
    pub total_work: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_error: Option<String>,
    pub log: Vec<String>,
}

impl RunReport {
    fn new(config: &Config, outcome: &PipelineOutcome, log: Vec<String>) -> Self {
        let copy = &outcome.copy;
        let (error, suggestion) = match &copy.cause {
            Some(cause) => {
                let (message, suggestion) = humanize_error(cause);
                (Some(message), suggestion)
            }
            None => (None, None),
        };
        let archive_error = match &outcome.archive {
            ArchiveOutcome::Failed(err) => Some(err.to_string()),
            _ => None,
        };

        Self {
            source: config.source.clone(),
            target: config.target.clone(),
            filters: config.filter.to_string(),
            status: copy.status,
            directories_copied: copy.directories_copied,
            files_copied: copy.files_copied,
            units_completed: copy.units_completed,
            total_work: copy.total_work,
            error,
            suggestion,
            archive: outcome.archive.path().cloned(),
            archive_error,
            log,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, TreeCopyError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TreeCopyError::Io(std::io::Error::other(e)))
    }

    /// Closing lines for the terminal: counts, then error details if any.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{}: {} directories, {} files ({}/{} entries)",
            self.status,
            self.directories_copied,
            self.files_copied,
            self.units_completed,
            self.total_work
        )];
        if let Some(error) = &self.error {
            lines.push(format!("  Error: {}", error));
        }
        if let Some(suggestion) = &self.suggestion {
            lines.push(format!("  Try: {}", suggestion));
        }
        if let Some(archive) = &self.archive {
            lines.push(format!("  Archive: {}", archive.display()));
        }
        if let Some(archive_error) = &self.archive_error {
            lines.push(format!("  Archive failed: {}", archive_error));
        }
        lines.join("\n")
    }
}

/// Run the copy operation
pub fn run(config: Config) -> Result<RunReport, TreeCopyError> {
    let reporter = if config.json {
        ProgressReporter::hidden()
    } else {
        ProgressReporter::new()
    };

    let mut log = Vec::new();
    if config.target_is_non_empty()? {
        tracing::warn!(
            target_dir = %config.target.display(),
            "target directory is not empty, existing entries will be merged"
        );
        log.push(format!(
            "Target directory {} is not empty. Directories will be merged and files overwritten.",
            config.target.display()
        ));
    }

    let selection = SelectionSet::from_picks(&config.source, &config.picks)?;
    tracing::info!(
        source = %config.source.display(),
        target = %config.target.display(),
        selected = selection.len(),
        "starting copy"
    );

    let request = CopyRequest {
        source_root: config.source.clone(),
        target_root: config.target.clone(),
        selection,
        filter: config.filter.clone(),
        archive: config.archive,
        options: CopyOptions {
            verify: config.verify,
        },
    };

    if !config.json {
        for line in &log {
            reporter.log_line(line);
        }
    }
    reporter.start(0);

    let handle = pipeline::spawn(request)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (outcome, lines) = runtime.block_on(drive(handle, &reporter, !config.json))?;

    reporter.finish(outcome.copy.status);
    log.extend(lines);
    Ok(RunReport::new(&config, &outcome, log))
}

/// Pump progress and status lines until the worker reports its outcome.
///
/// Ctrl-C sets the run's cancel flag once; the worker then stops at the
/// next directory or file boundary and still delivers an outcome.
async fn drive(
    mut handle: PipelineHandle,
    reporter: &ProgressReporter,
    echo_logs: bool,
) -> Result<(PipelineOutcome, Vec<String>), TreeCopyError> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut lines = Vec::new();

    let outcome = loop {
        tokio::select! {
            biased;
            Some(update) = handle.progress.recv() => reporter.update(update),
            Some(line) = handle.logs.recv() => {
                if echo_logs {
                    reporter.log_line(&line);
                }
                lines.push(line);
            }
            result = &mut handle.result => {
                break result.map_err(|_| {
                    TreeCopyError::Io(std::io::Error::other(
                        "copy worker stopped without delivering a result",
                    ))
                })?;
            }
            signal = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                match signal {
                    Ok(()) => {
                        tracing::warn!("interrupt received, cancelling copy");
                        handle.cancel();
                    }
                    Err(err) => tracing::warn!(error = %err, "cannot listen for interrupts"),
                }
            }
        }
    };

    // The outcome is sent last, so anything still queued is already here
    while let Ok(update) = handle.progress.try_recv() {
        reporter.update(update);
    }
    while let Ok(line) = handle.logs.try_recv() {
        if echo_logs {
            reporter.log_line(&line);
        }
        lines.push(line);
    }

    handle.join()?;
    Ok((outcome, lines))
}

/// Plain-English message and an optional suggestion for an error
pub fn humanize_error(error: &TreeCopyError) -> (String, Option<String>) {
    match error {
        TreeCopyError::Io(io) => match io.kind() {
            ErrorKind::NotFound => (
                "File or directory was not found".to_string(),
                Some("Verify the source tree did not change during the copy and retry.".to_string()),
            ),
            ErrorKind::PermissionDenied => (
                "Permission denied while accessing file".to_string(),
                Some("Check file permissions or run with a user that has access.".to_string()),
            ),
            _ => (
                format!("I/O operation failed: {}", io),
                Some("Retry the copy. If this keeps happening, check disk health.".to_string()),
            ),
        },
        TreeCopyError::PermissionDenied { path } => (
            format!("Permission denied while accessing {}", path.display()),
            Some("Check file permissions or run with a user that has access.".to_string()),
        ),
        TreeCopyError::DiskFull { path } => (
            format!("Not enough disk space to write {}", path.display()),
            Some("Free disk space on the target and retry.".to_string()),
        ),
        TreeCopyError::Conflict { path } => (
            format!("{} already exists and is not a directory", path.display()),
            Some("Remove or rename the conflicting file, then retry.".to_string()),
        ),
        TreeCopyError::ChecksumMismatch { path } => (
            format!("Copied content of {} does not match the source", path.display()),
            Some("Retry the copy and check the target device for errors.".to_string()),
        ),
        TreeCopyError::Archive(err) => (format!("Archive could not be written: {}", err), None),
        TreeCopyError::Config(msg) | TreeCopyError::Validation(msg) => (msg.clone(), None),
    }
}
