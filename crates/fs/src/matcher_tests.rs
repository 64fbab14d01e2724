use super::*;

use std::fs::{create_dir_all, write};

fn tree(files: &[&str]) -> tempfile::TempDir {
    let tmp = tempfile::tempdir().expect("create temp dir");
    for f in files {
        let path = tmp.path().join(f);
        if let Some(parent) = path.parent() {
            create_dir_all(parent).expect("create parent dirs");
        }
        write(&path, b"x").expect("write file");
    }
    tmp
}

fn collect_rel(matcher: &PathMatcher, root: &Path, limit: usize, threads: usize) -> Vec<String> {
    matcher
        .collect(root, limit, threads, &CancelToken::new())
        .expect("collect")
        .iter()
        .map(|p| relative_path(root, p).expect("relative path"))
        .collect()
}

#[test]
fn empty_pattern_list_defaults_to_recursive_all() {
    let matcher = PathMatcher::new::<&str>(&[]).expect("compile");
    assert_eq!(matcher.patterns(), &[DEFAULT_GLOB_PATTERN.to_string()]);
    assert!(matcher.matches("top.txt"));
    assert!(matcher.matches("a/b/c.txt"));
}

#[test]
fn single_star_does_not_cross_directories() {
    let matcher = PathMatcher::new(&["molecule/*"]).expect("compile");

    let cases = [
        ("molecule/a.pdb", true),
        ("molecule/deep/a.pdb", false),
        ("other/a.pdb", false),
    ];
    for (path, expected) in cases {
        assert_eq!(matcher.matches(path), expected, "path {path}");
    }
}

#[test]
fn character_classes_and_alternation_are_supported() {
    let matcher = PathMatcher::new(&["**/*.[ct]sv", "**/*.{pdb,sdf}"]).expect("compile");

    assert!(matcher.matches("data/x.csv"));
    assert!(matcher.matches("x.tsv"));
    assert!(matcher.matches("mol/ligand.sdf"));
    assert!(!matcher.matches("notes.txt"));
}

#[test]
fn malformed_pattern_names_the_offender() {
    let err = PathMatcher::new(&["**/*.txt", "a[bc"]).expect_err("should fail");
    match err {
        FsError::Pattern { pattern, .. } => assert_eq!(pattern, "a[bc"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn collect_returns_only_files_sorted() {
    let tmp = tree(&["b.txt", "a/x.txt", "a/y/z.txt"]);
    let root = tmp.path();
    create_dir_all(root.join("empty/nested")).expect("create empty dirs");

    let matcher = PathMatcher::default();
    let expected = vec!["a/x.txt", "a/y/z.txt", "b.txt"];

    assert_eq!(collect_rel(&matcher, root, 100, 1), expected);
    assert_eq!(collect_rel(&matcher, root, 100, 4), expected);
}

#[test]
fn collect_skips_the_cache_sentinel_at_root() {
    let tmp = tree(&["a.txt", CACHE_FILE_NAME, "sub/.st-tree.cache"]);
    let root = tmp.path();

    let got = collect_rel(&PathMatcher::default(), root, 100, 1);
    // Only the root-level sentinel is reserved.
    assert_eq!(got, vec!["a.txt", "sub/.st-tree.cache"]);
}

#[test]
fn collect_caps_at_limit_deterministically() {
    let files: Vec<String> = (0..20).map(|i| format!("d/f{i:02}.txt")).collect();
    let refs: Vec<&str> = files.iter().map(String::as_str).collect();
    let tmp = tree(&refs);
    let root = tmp.path();
    let matcher = PathMatcher::default();

    let first = collect_rel(&matcher, root, 5, 1);
    let second = collect_rel(&matcher, root, 5, 1);
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
    assert_eq!(first[0], "d/f00.txt");

    assert_eq!(collect_rel(&matcher, root, 5, 4).len(), 5);
}

#[test]
fn collect_on_missing_root_is_not_found() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let missing = tmp.path().join("nope");

    let err = PathMatcher::default()
        .collect(&missing, 10, 1, &CancelToken::new())
        .expect_err("missing root");
    assert!(matches!(err, FsError::NotFound { .. }));
}

#[test]
fn collect_on_file_root_is_not_found() {
    let tmp = tree(&["file.txt"]);
    let err = PathMatcher::default()
        .collect(&tmp.path().join("file.txt"), 10, 1, &CancelToken::new())
        .expect_err("file root");
    assert!(matches!(err, FsError::NotFound { .. }));
}

#[cfg(target_os = "linux")]
#[test]
fn collect_skips_non_utf8_names() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let tmp = tree(&["ok.txt"]);
    write(tmp.path().join(OsStr::from_bytes(b"bad\xff.txt")), b"x").expect("write file");

    for threads in [1, 4] {
        assert_eq!(
            collect_rel(&PathMatcher::default(), tmp.path(), 100, threads),
            vec!["ok.txt"],
            "threads {threads}"
        );
    }
}
