//! Filter → copy → archive pipeline and its background worker
//!
//! [`run`] executes the stages in order on the calling thread. [`spawn`]
//! moves the same sequence onto a dedicated worker thread and hands back
//! one-way channels for progress, status lines and the terminal outcome.

mod sink;

pub use sink::{LogSink, MemorySink, NullSink, ProgressSink};

use crate::archive::zip_directory;
use crate::executor::{copy_tree, CopyEvent, CopyOptions};
use crate::filter::apply_filters;
use crate::types::{
    CancelFlag, CopyResult, CopyStatus, FilterSpec, Progress, SelectionSet, TreeCopyError,
};
use std::path::PathBuf;
use std::thread;
use tokio::sync::{mpsc, oneshot};

/// Everything the pipeline needs for one run. Immutable once submitted.
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub selection: SelectionSet,
    pub filter: FilterSpec,
    /// Zip the target after a successful copy of at least one file
    pub archive: bool,
    pub options: CopyOptions,
}

impl CopyRequest {
    /// Request with default filters, no archive and no verification
    pub fn new(source_root: PathBuf, target_root: PathBuf, selection: SelectionSet) -> Self {
        Self {
            source_root,
            target_root,
            selection,
            filter: FilterSpec::default(),
            archive: false,
            options: CopyOptions::default(),
        }
    }
}

/// What happened to the optional archive stage
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// Archiving was not asked for
    NotRequested,
    /// Asked for, but the copy did not succeed or copied no files
    Skipped,
    Created(PathBuf),
    /// Archive failed; the copy result is unaffected
    Failed(TreeCopyError),
}

impl ArchiveOutcome {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ArchiveOutcome::Created(path) => Some(path),
            _ => None,
        }
    }
}

/// Terminal outcome of a pipeline run
#[derive(Debug)]
pub struct PipelineOutcome {
    pub copy: CopyResult,
    pub archive: ArchiveOutcome,
}

/// Run filter, copy and archive stages on the current thread.
pub fn run(
    request: &CopyRequest,
    cancel: &CancelFlag,
    progress: &dyn ProgressSink,
    log: &dyn LogSink,
) -> PipelineOutcome {
    log.append(format!("File filters: {}", request.filter));
    log.append("Copying files.".to_string());

    let filtered = match apply_filters(&request.source_root, &request.selection, &request.filter)
    {
        Ok(filtered) => filtered,
        Err(err) => {
            tracing::error!(error = %err, "filter stage failed");
            let copy = CopyResult::failed(err);
            report_copy_status(&copy, log);
            log.append(format!("Status: {}", copy.status));
            return PipelineOutcome {
                archive: skipped_archive(request),
                copy,
            };
        }
    };

    log.append(format!(
        "Filters applied. Directories [{}], Files [{}].",
        filtered.directory_count().saturating_sub(1),
        filtered.file_count()
    ));
    log.append("Copy in progress...".to_string());

    let forward_progress = |event: &CopyEvent| {
        if let Some(update) = event.progress() {
            progress.report(update);
        }
    };

    let copy = copy_tree(
        &request.source_root,
        &request.target_root,
        &filtered,
        cancel,
        request.options,
        Some(&forward_progress),
    );
    report_copy_status(&copy, log);

    let archive = if !request.archive {
        ArchiveOutcome::NotRequested
    } else if copy.status != CopyStatus::Succeeded {
        ArchiveOutcome::Skipped
    } else if copy.files_copied == 0 {
        log.append("Cannot create ZIP file with files count = 0".to_string());
        ArchiveOutcome::Skipped
    } else {
        log.append("Creating ZIP file, wait...".to_string());
        match zip_directory(&request.target_root) {
            Ok(path) => {
                log.append(format!("ZIP file created: {}", path.display()));
                ArchiveOutcome::Created(path)
            }
            Err(err) => {
                log.append(format!("ZIP file could not be created: {}", err));
                ArchiveOutcome::Failed(err)
            }
        }
    };

    log.append(format!("Status: {}", copy.status));
    PipelineOutcome { copy, archive }
}

fn skipped_archive(request: &CopyRequest) -> ArchiveOutcome {
    if request.archive {
        ArchiveOutcome::Skipped
    } else {
        ArchiveOutcome::NotRequested
    }
}

fn report_copy_status(copy: &CopyResult, log: &dyn LogSink) {
    match copy.status {
        CopyStatus::Succeeded => log.append(format!(
            "Copy completed. Directories copied [{}], Files copied [{}]",
            copy.directories_copied, copy.files_copied
        )),
        CopyStatus::Cancelled => log.append("Copy is cancelled by user.".to_string()),
        CopyStatus::Failed => {
            log.append("There was an error during the copy process:".to_string());
            let message = copy
                .cause
                .as_ref()
                .map(|cause| cause.to_string())
                .unwrap_or_else(|| "Unknown error".to_string());
            log.append(message);
        }
    }
}

/// Handle to a pipeline running on a background worker.
pub struct PipelineHandle {
    /// `(completed, total)` after every copied entry
    pub progress: mpsc::UnboundedReceiver<Progress>,
    /// Human-readable status lines
    pub logs: mpsc::UnboundedReceiver<String>,
    /// Delivered once, after every progress update and status line
    pub result: oneshot::Receiver<PipelineOutcome>,
    cancel: CancelFlag,
    worker: thread::JoinHandle<()>,
}

/// Outcome plus everything the worker sent, for callers that do not stream.
#[derive(Debug)]
pub struct FinishedRun {
    pub outcome: PipelineOutcome,
    pub logs: Vec<String>,
    pub progress: Vec<Progress>,
}

impl PipelineHandle {
    /// Ask the worker to stop at the next directory/file boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Shared cancellation flag of this run
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Join the worker thread after `result` has been consumed.
    pub fn join(self) -> Result<(), TreeCopyError> {
        self.worker.join().map_err(|_| worker_lost())
    }

    /// Block until the run finishes and collect everything it sent.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> Result<FinishedRun, TreeCopyError> {
        let PipelineHandle {
            mut progress,
            mut logs,
            result,
            worker,
            ..
        } = self;

        let outcome = result.blocking_recv().map_err(|_| worker_lost())?;
        worker.join().map_err(|_| worker_lost())?;

        let mut collected_logs = Vec::new();
        while let Ok(line) = logs.try_recv() {
            collected_logs.push(line);
        }
        let mut collected_progress = Vec::new();
        while let Ok(update) = progress.try_recv() {
            collected_progress.push(update);
        }

        Ok(FinishedRun {
            outcome,
            logs: collected_logs,
            progress: collected_progress,
        })
    }
}

fn worker_lost() -> TreeCopyError {
    TreeCopyError::Io(std::io::Error::other(
        "copy worker stopped without delivering a result",
    ))
}

/// Start the pipeline on a dedicated worker thread.
pub fn spawn(request: CopyRequest) -> Result<PipelineHandle, TreeCopyError> {
    spawn_with_cancel(request, CancelFlag::new())
}

/// Start the pipeline observing an existing cancellation flag.
pub fn spawn_with_cancel(
    request: CopyRequest,
    cancel: CancelFlag,
) -> Result<PipelineHandle, TreeCopyError> {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel::<Progress>();
    let (log_tx, log_rx) = mpsc::unbounded_channel::<String>();
    let (result_tx, result_rx) = oneshot::channel::<PipelineOutcome>();

    let worker_cancel = cancel.clone();
    let worker = thread::Builder::new()
        .name("treecopy-worker".to_string())
        .spawn(move || {
            let outcome = run(&request, &worker_cancel, &progress_tx, &log_tx);
            if result_tx.send(outcome).is_err() {
                tracing::warn!("pipeline result receiver dropped before completion");
            }
        })
        .map_err(TreeCopyError::Io)?;

    Ok(PipelineHandle {
        progress: progress_rx,
        logs: log_rx,
        result: result_rx,
        cancel,
        worker,
    })
}
