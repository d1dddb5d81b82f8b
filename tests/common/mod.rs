//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub fn create_test_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    let mut file = fs::File::create(path).expect("Failed to create test file");
    file.write_all(content)
        .expect("Failed to write test content");
    file.flush().expect("Failed to flush");
}

pub fn set_age_days(path: &Path, days: u64) {
    let mtime = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(mtime))
        .expect("Failed to set mtime");
}

/// Source tree `A/B/file1.txt` (today) and `A/B/file2.jpg` (40 days old).
///
/// Returns the temp dir holding everything and the canonical `A` root.
pub fn scenario_tree() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().join("A");
    create_test_file(&root.join("B/file1.txt"), b"first file");
    create_test_file(&root.join("B/file2.jpg"), b"\xff\xd8 not really a jpeg");
    set_age_days(&root.join("B/file2.jpg"), 40);
    let root = fs::canonicalize(&root).expect("Failed to canonicalize root");
    (temp, root)
}

/// Fresh, empty target directory next to the source.
pub fn empty_target(temp: &TempDir, name: &str) -> PathBuf {
    let target = temp.path().join(name);
    fs::create_dir(&target).expect("Failed to create target");
    fs::canonicalize(&target).expect("Failed to canonicalize target")
}

/// Every path under `dir`, relative and `/`-joined, sorted.
pub fn list_tree(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect(dir, dir, &mut out);
    out.sort();
    out
}

fn collect(base: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).expect("Failed to read dir") {
        let entry = entry.expect("Failed to read entry");
        let path = entry.path();
        let relative = path
            .strip_prefix(base)
            .expect("entry under base")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        out.push(relative);
        if path.is_dir() {
            collect(base, &path, out);
        }
    }
}
