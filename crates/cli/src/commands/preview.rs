use std::{collections::HashMap, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use log::error;
use sttree_fs::extract_record;
use sttree_preview::{
    Capability, PreviewConfig, PreviewDispatcher, PreviewOutcome, normalize_extension,
};
use sttree_runtime::DEFAULT_SUPERCELL;
use url::Url;

use crate::{
    commands::{EXIT_HARD, EXIT_SOFT},
    printer::{OutputFormat, make_printer},
};

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Root directory the path is relative to
    pub root: PathBuf,

    /// File to preview, relative to ROOT
    pub rel_path: String,

    /// Site mirroring the tree under `artifacts/`
    #[arg(long = "artifacts-site", value_name = "URL")]
    pub artifacts_site: Option<Url>,

    /// Map an extension to a viewer, ahead of the built-in table (repeatable)
    #[arg(long = "override", value_name = "EXT=CAPABILITY", value_parser = parse_override)]
    pub overrides: Vec<(String, Capability)>,

    /// Supercell expansion for generated crystal companions
    #[arg(long, value_name = "A,B,C", value_parser = parse_supercell)]
    pub supercell: Option<[u32; 3]>,

    /// Output the preview plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PreviewArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[preview] {e:#}");
            eprintln!("[preview] {e:#}");
            ExitCode::from(EXIT_HARD)
        }
    }
}

fn execute(args: PreviewArgs) -> Result<ExitCode> {
    let rel = args.rel_path.trim_start_matches("./");
    let record = extract_record(&args.root, &args.root.join(rel))
        .with_context(|| format!("reading {rel} under {}", args.root.display()))?;

    let config = PreviewConfig {
        artifacts_site: args.artifacts_site,
        overrides: args.overrides.into_iter().collect::<HashMap<_, _>>(),
        supercell: args.supercell.unwrap_or(DEFAULT_SUPERCELL),
        ..PreviewConfig::default()
    };
    let dispatcher = PreviewDispatcher::new(config);

    let mut printer = make_printer(OutputFormat::from_json_flag(args.json));
    match dispatcher.preview(&args.root, &record) {
        PreviewOutcome::Ready(plan) => {
            printer.print_plan(&plan)?;
            Ok(ExitCode::SUCCESS)
        }
        PreviewOutcome::Unavailable { path, extension } => {
            printer.print_unavailable(&path, extension.as_deref())?;
            Ok(ExitCode::from(EXIT_SOFT))
        }
        PreviewOutcome::Failed { path, message } => {
            printer.print_failed(&path, &message)?;
            Ok(ExitCode::from(EXIT_SOFT))
        }
    }
}

/// `csv=table` → (`"csv"`, `Capability::Table`)
pub(crate) fn parse_override(s: &str) -> Result<(String, Capability), String> {
    let (ext, cap) = s
        .split_once('=')
        .ok_or_else(|| format!("expected EXT=CAPABILITY, got {s:?}"))?;
    let ext = normalize_extension(ext);
    if ext.is_empty() {
        return Err(format!("empty extension in {s:?}"));
    }
    Ok((ext, cap.parse()?))
}

/// `3,3,1` → `[3, 3, 1]`
pub(crate) fn parse_supercell(s: &str) -> Result<[u32; 3], String> {
    let parts: Vec<u32> = s
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad supercell {s:?}: {e}"))?;

    match parts.as_slice() {
        [a, b, c] if *a > 0 && *b > 0 && *c > 0 => Ok([*a, *b, *c]),
        [_, _, _] => Err(format!("supercell factors must be positive, got {s:?}")),
        _ => Err(format!("expected three factors A,B,C, got {s:?}")),
    }
}

#[cfg(test)]
#[path = "preview_tests.rs"]
mod tests;
