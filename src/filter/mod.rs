//! Selection filtering by file type and modification date
//!
//! Walks the source tree once, pruning unselected directories, keeping the
//! selected files that pass both filters, and re-adding every directory on
//! the way to a kept file.

use crate::types::{DateOption, EntryKind, FilterSpec, FilteredSet, SelectionSet, TreeCopyError};
use chrono::{DateTime, Duration, Local, NaiveDate};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Apply `spec` to `selection`, using the local calendar date as "today".
///
/// # Errors
/// * `TreeCopyError::Io` if the walk fails or a file's modification time
///   cannot be read while a date window is active
pub fn apply_filters(
    source_root: &Path,
    selection: &SelectionSet,
    spec: &FilterSpec,
) -> Result<FilteredSet, TreeCopyError> {
    apply_filters_on(source_root, selection, spec, Local::now().date_naive())
}

/// Same as [`apply_filters`] with an explicit "today".
pub fn apply_filters_on(
    source_root: &Path,
    selection: &SelectionSet,
    spec: &FilterSpec,
    today: NaiveDate,
) -> Result<FilteredSet, TreeCopyError> {
    let start_time = Instant::now();
    let mut filtered = FilteredSet::new(source_root.to_path_buf());

    let selected = selection.clone();
    let walker = ignore::WalkBuilder::new(source_root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            // Unselected directories are pruned with their whole subtree
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !is_dir || selected.contains(entry.path())
        })
        .build();

    let mut kept_files = Vec::new();
    for result in walker {
        let entry = result?;
        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };

        if file_type.is_dir() {
            continue;
        }

        // Pipes, sockets and devices are never copied
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        if !selection.contains(path) {
            continue;
        }

        if file_type.is_symlink() && !links_to_regular_file(path) {
            continue;
        }

        if passes_type_filter(spec, path) && passes_date_filter(spec, path, today)? {
            kept_files.push(entry.into_path());
        }
    }

    for file in kept_files {
        // Every ancestor below the root was entered by the walk, so it is selected
        for ancestor in file.ancestors().skip(1) {
            if ancestor == source_root || !ancestor.starts_with(source_root) {
                break;
            }
            if filtered.contains(ancestor) {
                break;
            }
            filtered.insert(ancestor.to_path_buf(), EntryKind::Directory);
        }
        filtered.insert(file, EntryKind::File);
    }

    tracing::debug!(
        root = %source_root.display(),
        directories = filtered.directory_count().saturating_sub(1),
        files = filtered.file_count(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "filters applied"
    );

    Ok(filtered)
}

/// Extension token of a file: text after the last `.` of its name, or `""`.
///
/// Unlike [`Path::extension`], a leading dot counts, so `.profile` yields
/// `profile`.
pub fn extension_token(path: &Path) -> String {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return String::new(),
    };
    match name.rsplit_once('.') {
        Some((_, extension)) => extension.to_string(),
        None => String::new(),
    }
}

/// Links are copied by content, so only links resolving to a regular file
/// are kept. Links to directories are not followed.
fn links_to_regular_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => true,
        Ok(_) => {
            tracing::debug!(path = %path.display(), "skipping link to a non-file");
            false
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping dangling link");
            false
        }
    }
}

fn passes_type_filter(spec: &FilterSpec, path: &Path) -> bool {
    spec.accepts_extension(&extension_token(path))
}

fn passes_date_filter(
    spec: &FilterSpec,
    path: &Path,
    today: NaiveDate,
) -> Result<bool, TreeCopyError> {
    match spec.date_option.window_days() {
        None => Ok(true),
        Some(days) => {
            let file_date = modified_date(path)?;
            Ok(date_in_window(spec.date_option, file_date, today, days))
        }
    }
}

/// Strict comparison for every window, `Today` included: a file dated today
/// is not after today and does not pass.
fn date_in_window(option: DateOption, file_date: NaiveDate, today: NaiveDate, days: i64) -> bool {
    debug_assert!(option != DateOption::AllDays);
    file_date > today - Duration::days(days)
}

fn modified_date(path: &Path) -> Result<NaiveDate, TreeCopyError> {
    let mtime = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| {
            TreeCopyError::Io(std::io::Error::other(format!(
                "Failed to get modification time for {}: {}",
                path.display(),
                e
            )))
        })?;
    Ok(DateTime::<Local>::from(mtime).date_naive())
}
