//! FilteredSet - selection survivors plus re-included ancestor directories

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Kind of a filtered entry, recorded when it was walked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Working set consumed by the copy engine.
///
/// Always contains the source root as a structural anchor; the root is left
/// out of every work count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredSet {
    root: PathBuf,
    entries: BTreeMap<PathBuf, EntryKind>,
}

impl FilteredSet {
    /// Create a set holding only the root anchor
    pub fn new(root: PathBuf) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(root.clone(), EntryKind::Directory);
        Self { root, entries }
    }

    /// Insert an entry
    pub fn insert(&mut self, path: PathBuf, kind: EntryKind) {
        self.entries.insert(path, kind);
    }

    /// Source root anchor
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if a path survived filtering
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Kind of a retained path
    pub fn kind(&self, path: &Path) -> Option<EntryKind> {
        self.entries.get(path).copied()
    }

    /// Number of retained directories, root included
    pub fn directory_count(&self) -> usize {
        self.entries
            .values()
            .filter(|kind| **kind == EntryKind::Directory)
            .count()
    }

    /// Number of retained files
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .filter(|kind| **kind == EntryKind::File)
            .count()
    }

    /// Units of copy work: every directory except the root, plus every file
    pub fn total_work(&self) -> u64 {
        (self.directory_count().saturating_sub(1) + self.file_count()) as u64
    }

    /// Number of entries, root included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when only the root anchor is present
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Iterator over (path, kind) in path order
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, EntryKind)> {
        self.entries.iter().map(|(path, kind)| (path, *kind))
    }

    /// Paths relative to the root, root excluded
    pub fn relative_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .keys()
            .filter_map(|path| path.strip_prefix(&self.root).ok())
            .filter(|relative| !relative.as_os_str().is_empty())
    }
}
