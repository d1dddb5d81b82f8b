//! Copy engine: materializes a filtered working set under a target root

pub mod copy;

use crate::types::{
    CancelFlag, CopyResult, CopyStatus, EntryKind, FilteredSet, Progress, TreeCopyError,
};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use copy::{copy_file, verify_copy};

/// Copy behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Compare blake3 digests of every copied file with its source
    pub verify: bool,
}

/// Events emitted while copying.
#[derive(Debug)]
pub enum CopyEvent {
    /// Walk is about to start.
    Started { total_work: u64 },
    /// A directory was created, or an existing one was reused.
    DirectoryCopied {
        path: PathBuf,
        merged: bool,
        progress: Progress,
    },
    /// A file was copied.
    FileCopied {
        path: PathBuf,
        bytes: u64,
        progress: Progress,
    },
}

impl CopyEvent {
    /// Progress carried by this event, if any
    pub fn progress(&self) -> Option<Progress> {
        match self {
            CopyEvent::Started { .. } => None,
            CopyEvent::DirectoryCopied { progress, .. } | CopyEvent::FileCopied { progress, .. } => {
                Some(*progress)
            }
        }
    }
}

/// Optional callback used to receive copy events.
pub type CopyCallback<'a> = dyn Fn(&CopyEvent) + Send + Sync + 'a;

#[derive(Debug, Default)]
struct CopyCounters {
    directories: usize,
    files: usize,
    completed: u64,
}

enum WalkEnd {
    Completed,
    Cancelled,
}

/// Copy every entry of `filtered` from `source_root` to `target_root`.
///
/// The source tree is walked in pre-order. Directories outside `filtered`
/// are skipped with their subtree. Existing target directories are reused
/// and existing target files are overwritten. `cancel` is checked before
/// every directory and file visit.
///
/// The caller must make sure `target_root` is neither `source_root` nor
/// inside it.
///
/// Never returns an error: failures end the walk with
/// [`CopyStatus::Failed`] and the cause; entries already written stay on disk.
pub fn copy_tree(
    source_root: &Path,
    target_root: &Path,
    filtered: &FilteredSet,
    cancel: &CancelFlag,
    options: CopyOptions,
    on_event: Option<&CopyCallback<'_>>,
) -> CopyResult {
    let total_work = filtered.total_work();
    let mut counters = CopyCounters::default();

    emit_event(on_event, &CopyEvent::Started { total_work });

    let walk = walk_and_copy(
        source_root,
        target_root,
        filtered,
        cancel,
        options,
        total_work,
        &mut counters,
        on_event,
    );

    let (status, cause) = match walk {
        Ok(WalkEnd::Completed) => (CopyStatus::Succeeded, None),
        Ok(WalkEnd::Cancelled) => (CopyStatus::Cancelled, None),
        Err(err) => (CopyStatus::Failed, Some(err)),
    };

    tracing::info!(
        status = %status,
        directories = counters.directories,
        files = counters.files,
        completed = counters.completed,
        total = total_work,
        "copy walk finished"
    );

    CopyResult {
        directories_copied: counters.directories,
        files_copied: counters.files,
        units_completed: counters.completed,
        total_work,
        status,
        cause,
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_and_copy(
    source_root: &Path,
    target_root: &Path,
    filtered: &FilteredSet,
    cancel: &CancelFlag,
    options: CopyOptions,
    total_work: u64,
    counters: &mut CopyCounters,
    on_event: Option<&CopyCallback<'_>>,
) -> Result<WalkEnd, TreeCopyError> {
    let retained_dirs: Arc<HashSet<PathBuf>> = Arc::new(
        filtered
            .iter()
            .filter(|(_, kind)| *kind == EntryKind::Directory)
            .map(|(path, _)| path.clone())
            .collect(),
    );

    let walker = ignore::WalkBuilder::new(source_root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !is_dir || retained_dirs.contains(entry.path())
        })
        .build();

    for result in walker {
        if cancel.is_cancelled() {
            tracing::info!("cancellation observed, stopping copy walk");
            return Ok(WalkEnd::Cancelled);
        }

        let entry = result?;
        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };

        let path = entry.path();
        if entry.depth() == 0 {
            // The root maps onto the target root itself and is not a unit of work
            create_directory(target_root)?;
            continue;
        }

        if !filtered.contains(path) {
            continue;
        }

        let relative = path.strip_prefix(source_root).map_err(|_| {
            TreeCopyError::Io(std::io::Error::other(format!(
                "{} is outside the source root {}",
                path.display(),
                source_root.display()
            )))
        })?;
        let target = target_root.join(relative);

        if file_type.is_dir() {
            let merged = create_directory(&target)?;
            counters.directories += 1;
            counters.completed += 1;
            tracing::debug!(path = %relative.display(), merged, "directory copied");
            emit_event(
                on_event,
                &CopyEvent::DirectoryCopied {
                    path: relative.to_path_buf(),
                    merged,
                    progress: Progress {
                        completed: counters.completed,
                        total: total_work,
                    },
                },
            );
        } else {
            let bytes = copy_file(path, &target)?;
            if options.verify {
                verify_copy(path, &target)?;
            }
            counters.files += 1;
            counters.completed += 1;
            tracing::debug!(path = %relative.display(), bytes, "file copied");
            emit_event(
                on_event,
                &CopyEvent::FileCopied {
                    path: relative.to_path_buf(),
                    bytes,
                    progress: Progress {
                        completed: counters.completed,
                        total: total_work,
                    },
                },
            );
        }
    }

    Ok(WalkEnd::Completed)
}

/// Create `target`, reusing an existing directory.
///
/// Returns `true` when the directory already existed.
fn create_directory(target: &Path) -> Result<bool, TreeCopyError> {
    match fs::create_dir(target) {
        Ok(()) => Ok(false),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let metadata = fs::metadata(target).map_err(|e| TreeCopyError::from_io(target, e))?;
            if metadata.is_dir() {
                Ok(true)
            } else {
                Err(TreeCopyError::Conflict {
                    path: target.to_path_buf(),
                })
            }
        }
        Err(e) => Err(TreeCopyError::from_io(target, e)),
    }
}

fn emit_event(on_event: Option<&CopyCallback<'_>>, event: &CopyEvent) {
    if let Some(callback) = on_event {
        callback(event);
    }
}
