use super::*;

use std::fs::{create_dir_all, write};

fn tree(files: &[&str]) -> (tempfile::TempDir, Vec<PathBuf>) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let mut paths = Vec::new();
    for f in files {
        let path = tmp.path().join(f);
        if let Some(parent) = path.parent() {
            create_dir_all(parent).expect("create parent dirs");
        }
        write(&path, b"x").expect("write file");
        paths.push(path);
    }
    (tmp, paths)
}

fn kept_rel(root: &Path, res: &Resolution) -> Vec<String> {
    res.kept
        .iter()
        .map(|p| relative_path(root, p).expect("relative path"))
        .collect()
}

fn placeholder_paths(res: &Resolution) -> Vec<&str> {
    res.placeholders.iter().map(|r| r.path.as_str()).collect()
}

#[test]
fn rule_set_json_accepts_flat_and_structured_forms() {
    let flat: IgnoreRuleSet =
        serde_json::from_str(r#"["drop.txt", {"pattern": "tmp_\\d+"}]"#).expect("flat form");
    assert!(!flat.retain_parent());
    assert_eq!(
        flat.rules(),
        &[IgnoreRule::exact("drop.txt"), IgnoreRule::pattern(r"tmp_\d+")]
    );

    let structured: IgnoreRuleSet =
        serde_json::from_str(r#"{"retain_parent": true, "rules": ["drop.txt"]}"#)
            .expect("structured form");
    assert!(structured.retain_parent());
    assert_eq!(structured.rules(), &[IgnoreRule::exact("drop.txt")]);

    let camel: IgnoreRuleSet =
        serde_json::from_str(r#"{"retainParent": true, "rules": []}"#).expect("camel alias");
    assert!(camel.retain_parent());
    assert!(camel.is_empty());
}

#[test]
fn exact_rule_matches_substrings_of_the_base_name() {
    let resolver = IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("log")], false))
        .expect("compile");

    assert!(resolver.is_ignored("run.log"));
    assert!(resolver.is_ignored("logbook.txt"));
    assert!(!resolver.is_ignored("notes.txt"));
}

#[test]
fn pattern_rule_is_anchored_at_name_start() {
    let resolver = IgnoreResolver::new(&IgnoreRuleSet::new(
        vec![IgnoreRule::pattern(r"tmp_\d+")],
        false,
    ))
    .expect("compile");

    assert!(resolver.is_ignored("tmp_01.dat"));
    assert!(!resolver.is_ignored("keep_tmp_01.dat"));
}

#[test]
fn bad_regex_is_a_pattern_error() {
    let err = IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::pattern("(")], false))
        .err()
        .expect("should fail");
    assert!(matches!(err, FsError::Pattern { ref pattern, .. } if pattern == "("));
}

#[test]
fn rules_only_look_at_the_base_name() {
    let (tmp, paths) = tree(&["drop.txt/inner.txt", "a/drop.txt"]);
    let root = tmp.path();
    let resolver =
        IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("drop.txt")], false))
            .expect("compile");

    let res = resolver.resolve(root, paths);
    assert_eq!(kept_rel(root, &res), vec!["drop.txt/inner.txt"]);
}

#[test]
fn without_rules_every_candidate_survives() {
    let (tmp, paths) = tree(&["a.txt", "b/c.txt"]);
    let resolver = IgnoreResolver::new(&IgnoreRuleSet::default()).expect("compile");

    let res = resolver.resolve(tmp.path(), paths.clone());
    assert_eq!(res.kept, paths);
    assert!(res.placeholders.is_empty());
}

#[test]
fn survivor_in_directory_needs_no_placeholder() {
    let (tmp, paths) = tree(&["a/keep.txt", "a/drop.txt"]);
    let root = tmp.path();
    let resolver =
        IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("drop.txt")], true))
            .expect("compile");

    let res = resolver.resolve(root, paths);
    assert_eq!(kept_rel(root, &res), vec!["a/keep.txt"]);
    assert!(placeholder_paths(&res).is_empty());
}

#[test]
fn fully_ignored_directory_gets_placeholder_in_retain_mode() {
    let (tmp, paths) = tree(&["b/drop.txt"]);
    let root = tmp.path();
    let resolver =
        IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("drop.txt")], true))
            .expect("compile");

    let res = resolver.resolve(root, paths);
    assert!(res.kept.is_empty());
    assert_eq!(placeholder_paths(&res), vec!["b/"]);
    assert_eq!(res.placeholders[0].name, "b");
    assert_eq!(res.placeholders[0].size, 0);
}

#[test]
fn fully_ignored_directory_disappears_without_retain_mode() {
    let (tmp, paths) = tree(&["b/drop.txt"]);
    let resolver =
        IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("drop.txt")], false))
            .expect("compile");

    let res = resolver.resolve(tmp.path(), paths);
    assert!(res.kept.is_empty());
    assert!(res.placeholders.is_empty());
}

#[test]
fn root_level_rejections_never_produce_a_placeholder() {
    let (tmp, paths) = tree(&["drop.txt"]);
    let resolver =
        IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("drop.txt")], true))
            .expect("compile");

    let res = resolver.resolve(tmp.path(), paths);
    assert!(res.kept.is_empty());
    assert!(res.placeholders.is_empty());
}

#[test]
fn only_the_immediate_parent_of_a_rejection_is_considered() {
    // x/ has no direct files; x/y/ has only ignored ones; x/y/z/ has a survivor.
    let (tmp, paths) = tree(&["x/y/drop.txt", "x/y/z/keep.txt", "w/clean.txt"]);
    let root = tmp.path();
    let resolver =
        IgnoreResolver::new(&IgnoreRuleSet::new(vec![IgnoreRule::exact("drop")], true))
            .expect("compile");

    let res = resolver.resolve(root, paths);
    assert_eq!(kept_rel(root, &res), vec!["x/y/z/keep.txt", "w/clean.txt"]);
    assert_eq!(placeholder_paths(&res), vec!["x/y/"]);
}

#[test]
fn later_survivor_flips_an_earlier_rejection() {
    // Order within the directory must not matter.
    let (tmp, paths) = tree(&["c/a_drop.txt", "c/b_keep.txt", "c/c_drop.txt"]);
    let resolver = IgnoreResolver::new(&IgnoreRuleSet::new(
        vec![IgnoreRule::exact("_drop"), IgnoreRule::pattern("never")],
        true,
    ))
    .expect("compile");

    let res = resolver.resolve(tmp.path(), paths);
    assert_eq!(res.kept.len(), 1);
    assert!(res.placeholders.is_empty());
}
