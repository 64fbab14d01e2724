use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Args;
use crossbeam::{
    channel::{self, Sender},
    select,
};
use log::{error, warn};
use sttree_fs::{CancelToken, FsError, IgnoreRule, IgnoreRuleSet};
use sttree_indexer::{IndexError, IndexOptions, ensure_index};
use sttree_runtime::{DEFAULT_GLOB_PATTERN, DEFAULT_LIMIT};

use crate::{
    commands::EXIT_HARD,
    printer::{IndexPrintContext, OutputFormat, make_printer},
};

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Root directory to index
    pub root: PathBuf,

    /// Glob inclusion pattern relative to ROOT (repeatable)
    #[arg(long = "pattern", short = 'p', value_name = "GLOB")]
    pub patterns: Vec<String>,

    /// Ignore names containing this string (repeatable)
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Ignore names matching this regex from their start (repeatable)
    #[arg(long = "ignore-regex", value_name = "RE")]
    pub ignore_regex: Vec<String>,

    /// JSON rule set: a list of rules or {"retain_parent": .., "rules": [..]}
    #[arg(long = "ignore-file", value_name = "FILE")]
    pub ignore_file: Option<PathBuf>,

    /// List directories whose only direct children were ignored
    #[arg(long = "retain-parent")]
    pub retain_parent: bool,

    /// Maximum number of matched files
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Read and write the per-root cache file
    #[arg(long)]
    pub cache: bool,

    /// Rescan even if a cache exists
    #[arg(long)]
    pub rebuild: bool,

    /// Traversal threads; 1 keeps the listing deterministic
    #[arg(long, short = 'j', default_value_t = 1)]
    pub threads: usize,

    /// Cancel the scan after this many milliseconds
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Output records as NDJSON (one JSON object per line)
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: IndexArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[index] {e:#}");
            eprintln!("[index] {e:#}");
            ExitCode::from(EXIT_HARD)
        }
    }
}

fn execute(args: IndexArgs) -> Result<ExitCode> {
    let opts = build_options(&args)?;

    // Dropping the guard disarms the timer.
    let _deadline = args
        .timeout_ms
        .map(|ms| arm_deadline(opts.cancel.clone(), Duration::from_millis(ms)));

    let started = Instant::now();
    let index = match ensure_index(&args.root, &opts) {
        Ok(index) => index,
        Err(IndexError::Fs(FsError::Cancelled)) => {
            anyhow::bail!("scan of {} cancelled after timeout", args.root.display())
        }
        Err(e) => return Err(e).with_context(|| format!("indexing {}", args.root.display())),
    };

    let mut printer = make_printer(OutputFormat::from_json_flag(args.json));
    for record in &index.records {
        printer.print_record(record)?;
    }
    printer.finish_index(&IndexPrintContext {
        root: &args.root,
        total: index.records.len(),
        source: index.source,
        elapsed: started.elapsed(),
    })?;

    Ok(ExitCode::SUCCESS)
}

pub(crate) fn build_options(args: &IndexArgs) -> Result<IndexOptions> {
    let patterns = if args.patterns.is_empty() {
        vec![DEFAULT_GLOB_PATTERN.to_owned()]
    } else {
        args.patterns.clone()
    };

    Ok(IndexOptions {
        patterns,
        ignore: build_rule_set(args)?,
        limit: args.limit,
        use_cache: args.cache,
        force_rebuild: args.rebuild,
        threads: args.threads.max(1),
        cancel: CancelToken::new(),
    })
}

/// Rules from `--ignore-file` first, then `--ignore`, then `--ignore-regex`.
pub(crate) fn build_rule_set(args: &IndexArgs) -> Result<IgnoreRuleSet> {
    let from_file = match &args.ignore_file {
        Some(path) => read_rule_file(path)?,
        None => IgnoreRuleSet::default(),
    };

    let mut rules = from_file.rules().to_vec();
    rules.extend(args.ignore.iter().map(|s| IgnoreRule::exact(s.as_str())));
    rules.extend(
        args.ignore_regex
            .iter()
            .map(|p| IgnoreRule::pattern(p.as_str())),
    );

    Ok(IgnoreRuleSet::new(
        rules,
        from_file.retain_parent() || args.retain_parent,
    ))
}

fn read_rule_file(path: &Path) -> Result<IgnoreRuleSet> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading ignore rules from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing ignore rules in {}", path.display()))
}

fn arm_deadline(cancel: CancelToken, timeout: Duration) -> Sender<()> {
    let (done_tx, done_rx) = channel::bounded::<()>(0);

    thread::spawn(move || {
        select! {
            recv(done_rx) -> _ => {}
            recv(channel::after(timeout)) -> _ => {
                warn!("[index] timeout of {:?} reached, cancelling scan", timeout);
                cancel.cancel();
            }
        }
    });

    done_tx
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
