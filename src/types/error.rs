//! Error types for treecopy

use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for treecopy operations
#[derive(Debug, Error)]
pub enum TreeCopyError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (checked before the pipeline starts)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A directory could not be created because a non-directory occupies its path
    #[error("Conflict: {path} exists and is not a directory")]
    Conflict { path: PathBuf },

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// No space left on the target device
    #[error("Disk full while writing {path}")]
    DiskFull { path: PathBuf },

    /// Copied bytes differ from the source
    #[error("Checksum mismatch: {path}")]
    ChecksumMismatch { path: PathBuf },

    /// Archive writer failure
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl TreeCopyError {
    /// Map an OS error raised while touching `path` onto the closest variant.
    pub fn from_io(path: &Path, error: IoError) -> Self {
        if matches!(error.kind(), ErrorKind::PermissionDenied) {
            TreeCopyError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else if matches!(error.kind(), ErrorKind::StorageFull)
            || matches!(error.raw_os_error(), Some(28 | 122))
        {
            TreeCopyError::DiskFull {
                path: path.to_path_buf(),
            }
        } else {
            TreeCopyError::Io(error)
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            TreeCopyError::Validation(_) | TreeCopyError::Config(_)
        )
    }

    /// Check if this error is a directory/file conflict in the target
    pub fn is_conflict(&self) -> bool {
        matches!(self, TreeCopyError::Conflict { .. })
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        matches!(self, TreeCopyError::PermissionDenied { .. })
    }

    /// Check if this error is related to disk space
    pub fn is_disk_space_error(&self) -> bool {
        matches!(self, TreeCopyError::DiskFull { .. })
    }
}

impl From<ignore::Error> for TreeCopyError {
    fn from(error: ignore::Error) -> Self {
        if error.is_io() {
            match error.into_io_error() {
                Some(io) => TreeCopyError::Io(io),
                None => TreeCopyError::Io(IoError::other("directory walk failed")),
            }
        } else {
            TreeCopyError::Io(IoError::other(error.to_string()))
        }
    }
}
