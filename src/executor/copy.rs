//! Streaming file copy

use crate::hash::digest_file;
use crate::types::TreeCopyError;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Copy the bytes of `src` to `dest`, replacing any existing file.
///
/// The parent of `dest` must already exist. Only content is copied:
/// permissions and timestamps are left to the platform defaults.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(TreeCopyError)` - read/write failure, mapped by [`TreeCopyError::from_io`]
///
/// # Example
/// ```no_run
/// use treecopy::executor::copy_file;
/// use std::path::Path;
///
/// let bytes = copy_file(Path::new("source.txt"), Path::new("dest.txt"))?;
/// # Ok::<(), treecopy::TreeCopyError>(())
/// ```
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64, TreeCopyError> {
    let mut src_file = File::open(src).map_err(|e| TreeCopyError::from_io(src, e))?;
    let mut dest_file = File::create(dest).map_err(|e| TreeCopyError::from_io(dest, e))?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file
            .read(&mut buffer)
            .map_err(|e| TreeCopyError::from_io(src, e))?;

        if bytes_read == 0 {
            break;
        }

        dest_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| TreeCopyError::from_io(dest, e))?;
        total_bytes += bytes_read as u64;
    }

    dest_file.flush().map_err(|e| TreeCopyError::from_io(dest, e))?;

    Ok(total_bytes)
}

/// Compare source and copy by blake3 digest.
pub fn verify_copy(src: &Path, dest: &Path) -> Result<(), TreeCopyError> {
    let expected = digest_file(src)?;
    let actual = digest_file(dest)?;
    if expected == actual {
        return Ok(());
    }

    tracing::warn!(
        path = %dest.display(),
        expected = %expected,
        actual = %actual,
        "copied file does not match its source"
    );
    Err(TreeCopyError::ChecksumMismatch {
        path: dest.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_replaces_existing_content() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("src.txt");
        let dest = temp.path().join("dest.txt");
        fs::write(&src, b"short").expect("write src");
        fs::write(&dest, b"a much longer previous content").expect("write dest");

        let bytes = copy_file(&src, &dest).expect("copy file");

        assert_eq!(bytes, 5);
        assert_eq!(fs::read(&dest).expect("read dest"), b"short");
    }

    #[test]
    fn test_copy_file_missing_parent_fails() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("src.txt");
        fs::write(&src, b"data").expect("write src");

        let result = copy_file(&src, &temp.path().join("missing/dest.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_copy_detects_difference() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("a.bin");
        let dest = temp.path().join("b.bin");
        fs::write(&src, b"same").expect("write src");
        fs::write(&dest, b"same").expect("write dest");
        verify_copy(&src, &dest).expect("identical files verify");

        fs::write(&dest, b"diff").expect("rewrite dest");
        let err = verify_copy(&src, &dest).unwrap_err();
        assert!(matches!(err, TreeCopyError::ChecksumMismatch { .. }));
    }
}
