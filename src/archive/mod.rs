//! Zip archive of a copied tree
//!
//! The archive is written next to the directory, named `<directory>.zip`,
//! with one deflated entry per regular file.

use crate::types::TreeCopyError;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const ARCHIVE_BUFFER_SIZE: usize = 8 * 1024;

/// Archive location for `directory`: a sibling named `<name>.zip`.
pub fn archive_path_for(directory: &Path) -> Result<PathBuf, TreeCopyError> {
    let name = directory.file_name().ok_or_else(|| {
        TreeCopyError::Validation(format!(
            "Cannot name an archive for {}",
            directory.display()
        ))
    })?;
    let parent = directory.parent().ok_or_else(|| {
        TreeCopyError::Validation(format!(
            "{} has no parent directory to hold the archive",
            directory.display()
        ))
    })?;

    let mut file_name = name.to_os_string();
    file_name.push(".zip");
    Ok(parent.join(file_name))
}

/// Zip every regular file under `directory`.
///
/// Entry names are the files' paths relative to `directory`, `/`-separated;
/// directories get no entries of their own. File contents are streamed
/// through a fixed buffer. An existing archive at the output path is
/// replaced. On failure the partial archive is removed.
///
/// # Returns
/// * `Ok(PathBuf)` - path of the created archive
pub fn zip_directory(directory: &Path) -> Result<PathBuf, TreeCopyError> {
    let archive_path = archive_path_for(directory)?;
    tracing::info!(
        directory = %directory.display(),
        archive = %archive_path.display(),
        "creating archive"
    );

    match write_archive(directory, &archive_path) {
        Ok(entries) => {
            tracing::info!(entries, archive = %archive_path.display(), "archive created");
            Ok(archive_path)
        }
        Err(err) => {
            if let Err(remove_err) = fs::remove_file(&archive_path) {
                tracing::warn!(
                    archive = %archive_path.display(),
                    error = %remove_err,
                    "failed to remove partial archive"
                );
            }
            Err(err)
        }
    }
}

fn write_archive(directory: &Path, archive_path: &Path) -> Result<usize, TreeCopyError> {
    let file = File::create(archive_path).map_err(|e| TreeCopyError::from_io(archive_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    let walker = ignore::WalkBuilder::new(directory)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut buffer = [0u8; ARCHIVE_BUFFER_SIZE];
    let mut entries = 0usize;

    for result in walker {
        let entry = result?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(directory).map_err(|_| {
            TreeCopyError::Io(std::io::Error::other(format!(
                "{} is outside {}",
                path.display(),
                directory.display()
            )))
        })?;

        zip.start_file(entry_name(relative), options)?;

        let mut source = File::open(path).map_err(|e| TreeCopyError::from_io(path, e))?;
        loop {
            let bytes_read = source
                .read(&mut buffer)
                .map_err(|e| TreeCopyError::from_io(path, e))?;
            if bytes_read == 0 {
                break;
            }
            zip.write_all(&buffer[..bytes_read])
                .map_err(|e| TreeCopyError::from_io(archive_path, e))?;
        }

        entries += 1;
        tracing::debug!(entry = %relative.display(), "archived");
    }

    let mut writer = zip.finish()?;
    writer
        .flush()
        .map_err(|e| TreeCopyError::from_io(archive_path, e))?;

    Ok(entries)
}

/// Archive entry name: relative path components joined with `/`.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
