use super::*;

use clap::Parser;

use crate::commands::{Cli, Command};

#[test]
fn override_parsing() {
    assert_eq!(
        parse_override("csv=table"),
        Ok(("csv".to_owned(), Capability::Table))
    );
    assert_eq!(
        parse_override(".DAT=Text"),
        Ok(("dat".to_owned(), Capability::Text))
    );

    for bad in ["csv", "=table", "csv=spreadsheet"] {
        assert!(parse_override(bad).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn supercell_parsing() {
    assert_eq!(parse_supercell("3,3,1"), Ok([3, 3, 1]));
    assert_eq!(parse_supercell(" 2, 2 ,2"), Ok([2, 2, 2]));

    for bad in ["2,2", "1,2,3,4", "0,1,1", "a,b,c", ""] {
        assert!(parse_supercell(bad).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn preview_flags_parse() {
    let cli = Cli::try_parse_from([
        "sttree",
        "preview",
        "/tmp/run",
        "relax/POSCAR",
        "--artifacts-site",
        "http://localhost:1024",
        "--override",
        "dat=table",
        "--override",
        "log=json",
        "--supercell",
        "1,1,2",
        "--json",
    ])
    .expect("parse args");

    let Command::Preview(args) = cli.command else {
        panic!("expected preview command");
    };
    assert_eq!(args.rel_path, "relax/POSCAR");
    assert_eq!(
        args.artifacts_site.map(|u| u.to_string()).as_deref(),
        Some("http://localhost:1024/")
    );
    assert_eq!(
        args.overrides,
        vec![
            ("dat".to_owned(), Capability::Table),
            ("log".to_owned(), Capability::Json),
        ]
    );
    assert_eq!(args.supercell, Some([1, 1, 2]));
    assert!(args.json);
}

#[test]
fn malformed_flags_are_rejected() {
    for argv in [
        ["sttree", "preview", "/r", "a", "--supercell", "2,2"],
        ["sttree", "preview", "/r", "a", "--override", "nope"],
        ["sttree", "preview", "/r", "a", "--artifacts-site", "not a url"],
    ] {
        assert!(Cli::try_parse_from(argv).is_err(), "accepted {argv:?}");
    }
}
