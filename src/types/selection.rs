//! SelectionSet - caller-chosen paths under a single source root

use super::TreeCopyError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Set of absolute paths (files and directories) picked under `root`.
///
/// The root itself is always a member. Immutable once built; clones share
/// the underlying set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    root: PathBuf,
    paths: Arc<HashSet<PathBuf>>,
}

impl SelectionSet {
    /// Create a selection from an explicit set of paths.
    pub fn new<I>(root: impl Into<PathBuf>, paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let root = root.into();
        let mut paths: HashSet<PathBuf> = paths.into_iter().collect();
        paths.insert(root.clone());
        Self {
            root,
            paths: Arc::new(paths),
        }
    }

    /// Select every file and directory under `root`.
    pub fn whole_tree(root: impl Into<PathBuf>) -> Result<Self, TreeCopyError> {
        let root = root.into();
        let mut paths = HashSet::new();
        add_subtree(&mut paths, &root)?;
        Ok(Self::new(root, paths))
    }

    /// Build a selection the way a checkbox tree does.
    ///
    /// Each pick is selected along with its ancestors up to `root` and, for
    /// directories, its whole subtree. Relative picks are resolved against
    /// `root`. No picks selects the whole tree.
    pub fn from_picks<P: AsRef<Path>>(
        root: impl Into<PathBuf>,
        picks: &[P],
    ) -> Result<Self, TreeCopyError> {
        let root = root.into();
        if picks.is_empty() {
            return Self::whole_tree(root);
        }

        let canonical_root = std::fs::canonicalize(&root).map_err(|e| {
            TreeCopyError::Validation(format!(
                "Source directory {} cannot be read: {}",
                root.display(),
                e
            ))
        })?;

        let mut paths = HashSet::new();
        for pick in picks {
            let pick = pick.as_ref();
            let joined = if pick.is_absolute() {
                pick.to_path_buf()
            } else {
                root.join(pick)
            };
            let resolved = resolve_pick(&joined)?;

            let relative = resolved.strip_prefix(&canonical_root).map_err(|_| {
                TreeCopyError::Validation(format!(
                    "Selected path {} is not under the source directory {}",
                    joined.display(),
                    root.display()
                ))
            })?;
            // Stored in the root's own spelling so walker paths match
            let absolute = if relative.as_os_str().is_empty() {
                root.clone()
            } else {
                root.join(relative)
            };

            let metadata = std::fs::symlink_metadata(&absolute)
                .map_err(|e| unreadable_pick(&joined, e))?;

            for ancestor in absolute.ancestors() {
                paths.insert(ancestor.to_path_buf());
                if ancestor == root {
                    break;
                }
            }

            if metadata.is_dir() {
                add_subtree(&mut paths, &absolute)?;
            }
        }

        Ok(Self::new(root, paths))
    }

    /// Source root of the selection
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if a path is selected
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Number of selected paths, root included
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false: the root is a member
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterator over the selected paths
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

/// Resolve `.`, `..` and links in the directories leading to `pick`.
///
/// The last component is kept as is, so a picked link stays a link.
fn resolve_pick(pick: &Path) -> Result<PathBuf, TreeCopyError> {
    let name = match pick.file_name() {
        Some(name) => name,
        None => return std::fs::canonicalize(pick).map_err(|e| unreadable_pick(pick, e)),
    };
    let parent = pick.parent().unwrap_or_else(|| Path::new("."));
    let parent = std::fs::canonicalize(parent).map_err(|e| unreadable_pick(pick, e))?;
    Ok(parent.join(name))
}

fn unreadable_pick(pick: &Path, error: std::io::Error) -> TreeCopyError {
    TreeCopyError::Validation(format!(
        "Selected path {} cannot be read: {}",
        pick.display(),
        error
    ))
}

fn add_subtree(paths: &mut HashSet<PathBuf>, dir: &Path) -> Result<(), TreeCopyError> {
    let walker = ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .build();
    for result in walker {
        let entry = result?;
        paths.insert(entry.into_path());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let temp = TempDir::new().expect("create temp dir");
        fs::create_dir_all(temp.path().join("docs/old")).expect("create dirs");
        fs::create_dir_all(temp.path().join("media")).expect("create media");
        fs::write(temp.path().join("docs/a.txt"), b"a").expect("write a");
        fs::write(temp.path().join("docs/old/b.txt"), b"b").expect("write b");
        fs::write(temp.path().join("media/c.jpg"), b"c").expect("write c");
        temp
    }

    #[test]
    fn test_new_always_contains_root() {
        let selection = SelectionSet::new("/src", vec![PathBuf::from("/src/a.txt")]);
        assert!(selection.contains(Path::new("/src")));
        assert!(selection.contains(Path::new("/src/a.txt")));
        assert_eq!(selection.len(), 2);
        assert!(!selection.is_empty());
    }

    #[test]
    fn test_whole_tree_selects_everything() {
        let temp = sample_tree();
        let root = temp.path();
        let selection = SelectionSet::whole_tree(root).expect("select tree");

        // root, docs, docs/old, media + 3 files
        assert_eq!(selection.len(), 7);
        assert!(selection.contains(&root.join("docs/old/b.txt")));
        assert!(selection.contains(&root.join("media/c.jpg")));
    }

    #[test]
    fn test_from_picks_adds_ancestors_and_subtree() {
        let temp = sample_tree();
        let root = temp.path();
        let selection = SelectionSet::from_picks(root, &["docs/old"]).expect("select picks");

        assert!(selection.contains(root));
        assert!(selection.contains(&root.join("docs")));
        assert!(selection.contains(&root.join("docs/old")));
        assert!(selection.contains(&root.join("docs/old/b.txt")));
        assert!(!selection.contains(&root.join("docs/a.txt")));
        assert!(!selection.contains(&root.join("media")));
    }

    #[test]
    fn test_from_picks_single_file() {
        let temp = sample_tree();
        let root = temp.path();
        let pick = root.join("media/c.jpg");
        let selection = SelectionSet::from_picks(root, &[pick.clone()]).expect("select file");

        assert_eq!(selection.len(), 3);
        assert!(selection.contains(&pick));
        assert!(selection.contains(&root.join("media")));
    }

    #[test]
    fn test_from_picks_rejects_outside_root() {
        let temp = sample_tree();
        let other = TempDir::new().expect("create other dir");
        let err = SelectionSet::from_picks(temp.path(), &[other.path()]).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_from_picks_rejects_missing_path() {
        let temp = sample_tree();
        let err = SelectionSet::from_picks(temp.path(), &["nope.txt"]).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_from_picks_resolves_parent_components() {
        let temp = sample_tree();
        let root = fs::canonicalize(temp.path()).expect("canonical root");
        let selection =
            SelectionSet::from_picks(&root, &["docs/../media"]).expect("select picks");

        assert!(selection.contains(&root.join("media")));
        assert!(selection.contains(&root.join("media/c.jpg")));
        assert!(!selection.contains(&root.join("docs")));
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_from_picks_rejects_escape_through_parent() {
        let temp = sample_tree();
        let root = temp.path().join("docs");
        let err = SelectionSet::from_picks(&root, &["old/../../media"]).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_picks_accepts_linked_spelling_of_root() {
        let temp = sample_tree();
        let root = fs::canonicalize(temp.path()).expect("canonical root");
        let aliases = TempDir::new().expect("create alias dir");
        let alias = aliases.path().join("alias");
        std::os::unix::fs::symlink(&root, &alias).expect("link root");

        let selection = SelectionSet::from_picks(&root, &[alias.join("media/c.jpg")])
            .expect("select through alias");

        assert!(selection.contains(&root.join("media/c.jpg")));
        assert!(selection.contains(&root.join("media")));
    }
}
