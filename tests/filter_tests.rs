//! Tests for type and date filtering of a selection

mod common;

use common::{create_test_file, scenario_tree, set_age_days};
use std::path::PathBuf;
use tempfile::TempDir;
use treecopy::filter::apply_filters;
use treecopy::{DateOption, EntryKind, FilterSpec, SelectionSet};

#[test]
fn test_scenario_keeps_txt_and_its_directory() {
    let (_temp, root) = scenario_tree();
    let selection = SelectionSet::whole_tree(&root).expect("select tree");
    let spec = FilterSpec::new(DateOption::AllDays, ["txt"]);

    let filtered = apply_filters(&root, &selection, &spec).expect("apply filters");

    let relative: Vec<PathBuf> = filtered.relative_paths().map(PathBuf::from).collect();
    assert_eq!(
        relative,
        vec![PathBuf::from("B"), PathBuf::from("B").join("file1.txt")]
    );
    assert!(filtered.contains(&root));
    assert_eq!(filtered.kind(&root.join("B")), Some(EntryKind::Directory));
    assert_eq!(filtered.total_work(), 2);
}

#[test]
fn test_filtered_set_is_subset_of_selection() {
    let (_temp, root) = scenario_tree();
    create_test_file(&root.join("C/notes.txt"), b"notes");
    create_test_file(&root.join("readme"), b"no extension");
    let selection = SelectionSet::whole_tree(&root).expect("select tree");

    for spec in [
        FilterSpec::default(),
        FilterSpec::new(DateOption::AllDays, ["txt"]),
        FilterSpec::new(DateOption::Last30Days, ["jpg", ""]),
    ] {
        let filtered = apply_filters(&root, &selection, &spec).expect("apply filters");
        for (path, _) in filtered.iter() {
            assert!(selection.contains(path), "{} not selected", path.display());
        }
    }
}

#[test]
fn test_directory_without_kept_files_is_dropped() {
    let (_temp, root) = scenario_tree();
    create_test_file(&root.join("C/photo.jpg"), b"jpg");
    let selection = SelectionSet::whole_tree(&root).expect("select tree");
    let spec = FilterSpec::new(DateOption::AllDays, ["txt"]);

    let filtered = apply_filters(&root, &selection, &spec).expect("apply filters");

    assert!(!filtered.contains(&root.join("C")));
    assert!(!filtered.contains(&root.join("C/photo.jpg")));
}

#[test]
fn test_every_kept_file_has_its_ancestors() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().to_path_buf();
    create_test_file(&root.join("x/y/z/deep.txt"), b"deep");
    let selection = SelectionSet::whole_tree(&root).expect("select tree");

    let filtered =
        apply_filters(&root, &selection, &FilterSpec::default()).expect("apply filters");

    let deep = root.join("x/y/z/deep.txt");
    assert_eq!(filtered.kind(&deep), Some(EntryKind::File));
    for ancestor in deep.ancestors().skip(1) {
        assert!(filtered.contains(ancestor), "{} missing", ancestor.display());
        if ancestor == root {
            break;
        }
    }
    assert_eq!(filtered.directory_count(), 4);
}

#[test]
fn test_unselected_directory_is_pruned() {
    let (_temp, root) = scenario_tree();
    create_test_file(&root.join("C/other.txt"), b"other");
    let selection = SelectionSet::from_picks(&root, &["B/file1.txt"]).expect("select pick");

    let filtered =
        apply_filters(&root, &selection, &FilterSpec::default()).expect("apply filters");

    assert!(filtered.contains(&root.join("B/file1.txt")));
    assert!(!filtered.contains(&root.join("B/file2.jpg")));
    assert!(!filtered.contains(&root.join("C")));
    assert!(!filtered.contains(&root.join("C/other.txt")));
}

#[test]
fn test_picked_directory_selects_subtree() {
    let (_temp, root) = scenario_tree();
    create_test_file(&root.join("C/other.txt"), b"other");
    let selection = SelectionSet::from_picks(&root, &["B"]).expect("select pick");

    let filtered =
        apply_filters(&root, &selection, &FilterSpec::default()).expect("apply filters");

    assert_eq!(filtered.file_count(), 2);
    assert!(!filtered.contains(&root.join("C/other.txt")));
}

#[test]
fn test_date_windows() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().to_path_buf();
    create_test_file(&root.join("fresh.txt"), b"now");
    create_test_file(&root.join("week.txt"), b"3 days");
    create_test_file(&root.join("month.txt"), b"20 days");
    create_test_file(&root.join("old.txt"), b"40 days");
    set_age_days(&root.join("week.txt"), 3);
    set_age_days(&root.join("month.txt"), 20);
    set_age_days(&root.join("old.txt"), 40);
    let selection = SelectionSet::whole_tree(&root).expect("select tree");

    let kept = |date: DateOption| -> Vec<String> {
        let spec = FilterSpec::new(date, ["All"]);
        let filtered = apply_filters(&root, &selection, &spec).expect("apply filters");
        filtered
            .relative_paths()
            .map(|p| p.display().to_string())
            .collect()
    };

    assert_eq!(
        kept(DateOption::AllDays),
        vec!["fresh.txt", "month.txt", "old.txt", "week.txt"]
    );
    assert_eq!(
        kept(DateOption::Last30Days),
        vec!["fresh.txt", "month.txt", "week.txt"]
    );
    assert_eq!(kept(DateOption::Last7Days), vec!["fresh.txt", "week.txt"]);
    // "Today" means strictly after today's date, so nothing written today passes
    assert!(kept(DateOption::Today).is_empty());
}

#[test]
fn test_empty_extension_token_matches_names_without_dot() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().to_path_buf();
    create_test_file(&root.join("Makefile"), b"all:");
    create_test_file(&root.join("archive.tar.gz"), b"gz");
    let selection = SelectionSet::whole_tree(&root).expect("select tree");

    let no_ext = apply_filters(&root, &selection, &FilterSpec::new(DateOption::AllDays, [""]))
        .expect("apply filters");
    assert!(no_ext.contains(&root.join("Makefile")));
    assert!(!no_ext.contains(&root.join("archive.tar.gz")));

    let gz = apply_filters(&root, &selection, &FilterSpec::new(DateOption::AllDays, ["gz"]))
        .expect("apply filters");
    assert!(gz.contains(&root.join("archive.tar.gz")));
}

#[test]
fn test_missing_source_root_fails() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let missing = temp.path().join("gone");
    let selection = SelectionSet::new(missing.clone(), std::iter::empty());

    let result = apply_filters(&missing, &selection, &FilterSpec::default());
    assert!(result.is_err());
}

#[test]
fn test_parent_components_in_pick_select_the_named_directory() {
    let (_temp, root) = scenario_tree();
    create_test_file(&root.join("C/other.txt"), b"other");
    let selection = SelectionSet::from_picks(&root, &["B/../C"]).expect("select pick");

    let filtered =
        apply_filters(&root, &selection, &FilterSpec::default()).expect("apply filters");

    let relative: Vec<PathBuf> = filtered.relative_paths().map(PathBuf::from).collect();
    assert_eq!(
        relative,
        vec![PathBuf::from("C"), PathBuf::from("C").join("other.txt")]
    );
    assert!(!selection.contains(&root.join("B")));
}
