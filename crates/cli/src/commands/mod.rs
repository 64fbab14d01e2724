pub mod cache;
pub mod index;
pub mod preview;

use clap::{Parser, Subcommand};
pub use cache::CacheArgs;
pub use index::IndexArgs;
pub use preview::PreviewArgs;

/// Soft failure: nothing to show, but nothing broke either.
pub const EXIT_SOFT: u8 = 1;
/// Hard error: bad input, unreadable tree, failed write.
pub const EXIT_HARD: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "sttree",
    version,
    about = "sttree - file tree indexing and preview routing",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the files under a root, filtered by globs and ignore rules.
    ///
    /// Example:
    ///   sttree index ./run -p 'molecule/*' --ignore .DS_Store
    ///   sttree index ./run --cache --rebuild --json
    Index(IndexArgs),

    /// Decide how one file under a root should be previewed.
    ///
    /// Example:
    ///   sttree preview ./run relax/POSCAR --supercell 3,3,1
    ///   sttree preview ./run data.dat --override dat=table
    Preview(PreviewArgs),

    /// Manage the per-root listing cache.
    Cache(CacheArgs),
}
