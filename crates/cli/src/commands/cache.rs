use std::{path::PathBuf, process::ExitCode};

use clap::{Args, Subcommand};
use log::error;
use sttree_indexer::{cache_path, clear_cache};

use crate::commands::{EXIT_HARD, EXIT_SOFT};

#[derive(Debug, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove the cache sentinel under ROOT.
    Clear {
        /// Indexed root directory
        root: PathBuf,
    },
}

pub fn run(args: CacheArgs) -> ExitCode {
    match args.action {
        CacheAction::Clear { root } => match clear_cache(&root) {
            Ok(true) => {
                eprintln!("[cache] removed {}", cache_path(&root).display());
                ExitCode::SUCCESS
            }
            Ok(false) => {
                eprintln!("[cache] no cache under {}", root.display());
                ExitCode::from(EXIT_SOFT)
            }
            Err(e) => {
                error!("[cache] {e}");
                eprintln!("[cache] {e}");
                ExitCode::from(EXIT_HARD)
            }
        },
    }
}
