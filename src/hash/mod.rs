//! Content digests for copy verification

use crate::types::TreeCopyError;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const DIGEST_READ_SIZE: usize = 64 * 1024;

/// Blake3 digest of one file's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileDigest([u8; 32]);

impl FileDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<blake3::Hash> for FileDigest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Digest a file, reading it sequentially in 64 KiB blocks.
///
/// # Example
/// ```no_run
/// use treecopy::hash::digest_file;
/// use std::path::Path;
///
/// let digest = digest_file(Path::new("file.txt"))?;
/// println!("{}", digest);
/// # Ok::<(), treecopy::TreeCopyError>(())
/// ```
pub fn digest_file(path: &Path) -> Result<FileDigest, TreeCopyError> {
    let file = File::open(path).map_err(|e| TreeCopyError::from_io(path, e))?;
    let mut reader = BufReader::with_capacity(DIGEST_READ_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut block = [0u8; DIGEST_READ_SIZE];

    loop {
        match reader.read(&mut block) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&block[..n]);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TreeCopyError::from_io(path, e)),
        }
    }

    Ok(hasher.finalize().into())
}
