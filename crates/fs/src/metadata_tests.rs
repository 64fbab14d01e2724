use super::*;

use std::{
    fs::{create_dir_all, write},
    time::Duration,
};

#[test]
fn to_unix_millis_handles_none_and_various_times() {
    let cases: &[(Option<SystemTime>, u64)] = &[
        (None, 0),
        (Some(UNIX_EPOCH), 0),
        (Some(UNIX_EPOCH + Duration::from_secs(42)), 42_000),
        (Some(UNIX_EPOCH + Duration::from_millis(1_500)), 1_500),
        (UNIX_EPOCH.checked_sub(Duration::from_secs(1)), 0),
    ];

    for (input, expected) in cases {
        assert_eq!(to_unix_millis(*input), *expected, "input {:?}", input);
    }
}

#[test]
fn relative_path_strips_root_and_uses_forward_slashes() {
    let root = Path::new("/data/root");

    let cases = [
        ("/data/root/a.txt", Some("a.txt")),
        ("/data/root/x/y/z.bin", Some("x/y/z.bin")),
        ("/data/root", None),
        ("/elsewhere/a.txt", None),
        ("/data/root/./x/a.txt", Some("x/a.txt")),
        ("/data/root/a/../b.txt", None),
        ("/data/root/../root/b.txt", None),
    ];
    for (path, expected) in cases {
        assert_eq!(
            relative_path(root, Path::new(path)).as_deref(),
            expected,
            "path {path}"
        );
    }
}

#[test]
fn extract_record_fills_name_size_and_times() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    create_dir_all(root.join("nested")).expect("create nested");
    let file = root.join("nested/hello.txt");
    write(&file, b"hello world").expect("write file");

    let rec = extract_record(root, &file).expect("extract");

    assert_eq!(rec.path, "nested/hello.txt");
    assert_eq!(rec.name, "hello.txt");
    assert_eq!(rec.size, 11);
    assert!(!rec.path.starts_with('/'));
    assert!(!rec.is_placeholder());

    // Freshly written: all timestamps are real and in milliseconds.
    let now_ms = to_unix_millis(Some(SystemTime::now()));
    for t in [rec.create_time, rec.update_time, rec.access_time] {
        assert!(t > 1_000_000_000_000, "expected millisecond timestamp, got {t}");
        assert!(t <= now_ms + 1_000);
    }
}

#[test]
fn extract_record_on_vanished_entry_is_not_found() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let err = extract_record(tmp.path(), &tmp.path().join("gone.txt")).expect_err("missing");
    assert!(matches!(err, FsError::NotFound { .. }));
}

#[test]
fn extract_record_rejects_paths_climbing_through_parent_dirs() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    create_dir_all(root.join("a")).expect("create a");
    write(root.join("b.txt"), b"b").expect("write b");
    write(root.join("a/b.txt"), b"decoy").expect("write decoy");

    let err = extract_record(root, &root.join("a/../b.txt")).expect_err("dotdot");
    assert!(matches!(err, FsError::NotFound { .. }));

    let rec = extract_record(root, &root.join("./b.txt")).expect("curdir");
    assert_eq!(rec.path, "b.txt");
}

#[test]
fn extract_all_skips_entries_that_vanished() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    write(root.join("a.txt"), b"a").expect("write a");
    write(root.join("b.txt"), b"bb").expect("write b");

    let paths = vec![root.join("a.txt"), root.join("raced.txt"), root.join("b.txt")];
    let records = extract_all(root, &paths);

    let got: Vec<(&str, u64)> = records.iter().map(|r| (r.path.as_str(), r.size)).collect();
    assert_eq!(got, vec![("a.txt", 1), ("b.txt", 2)]);
}

#[test]
fn placeholder_record_has_trailing_separator_and_zero_size() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();
    create_dir_all(root.join("a/b")).expect("create dirs");
    write(root.join("a/b/data.bin"), vec![0u8; 64]).expect("write data");

    let rec = placeholder_record(root, "a/b");
    assert_eq!(rec.path, "a/b/");
    assert_eq!(rec.name, "b");
    assert_eq!(rec.size, 0);
    assert!(rec.is_placeholder());
    assert!(rec.update_time > 0);

    let gone = placeholder_record(root, "missing");
    assert_eq!(gone.path, "missing/");
    assert_eq!((gone.create_time, gone.update_time, gone.access_time), (0, 0, 0));
}

#[test]
fn file_record_extension_is_lowercase_without_dot() {
    let rec = |name: &str| FileRecord {
        path: name.to_owned(),
        name: name.to_owned(),
        size: 0,
        create_time: 0,
        update_time: 0,
        access_time: 0,
    };

    let cases = [
        ("ligand.SDF", Some("sdf")),
        ("archive.tar.gz", Some("gz")),
        (".bashrc", None),
        ("POSCAR", None),
        ("trailing.", None),
    ];
    for (name, expected) in cases {
        assert_eq!(rec(name).extension().as_deref(), expected, "name {name}");
    }
}

#[test]
fn file_record_serializes_with_snake_case_time_keys() {
    let rec = FileRecord {
        path: "a/b.txt".into(),
        name: "b.txt".into(),
        size: 3,
        create_time: 1,
        update_time: 2,
        access_time: 3,
    };

    let json = serde_json::to_value(&rec).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "path": "a/b.txt",
            "name": "b.txt",
            "size": 3,
            "create_time": 1,
            "update_time": 2,
            "access_time": 3,
        })
    );
}
