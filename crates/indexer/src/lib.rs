mod cache;
mod error;

use std::path::Path;

use log::{debug, info, warn};
use sttree_fs::{
    CancelToken, FileRecord, FsError, IgnoreResolver, IgnoreRuleSet, PathMatcher, extract_all,
};
use sttree_runtime::{DEFAULT_GLOB_PATTERN, DEFAULT_LIMIT};

pub use cache::{cache_path, clear_cache, encode_records, load_cache, store_cache};
pub use error::IndexError;

/// Everything that shapes one index request.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Glob inclusion patterns, relative to the root
    pub patterns: Vec<String>,
    pub ignore: IgnoreRuleSet,
    /// Maximum number of matched candidates
    pub limit: usize,
    pub use_cache: bool,
    /// Ignore an existing cache and rescan (only meaningful with `use_cache`)
    pub force_rebuild: bool,
    /// Traversal workers; 1 keeps the scan sequential and deterministic
    pub threads: usize,
    pub cancel: CancelToken,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_GLOB_PATTERN.to_owned()],
            ignore: IgnoreRuleSet::default(),
            limit: DEFAULT_LIMIT,
            use_cache: false,
            force_rebuild: false,
            threads: 1,
            cancel: CancelToken::new(),
        }
    }
}

/// Where a returned index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Cache,
    Scan,
}

#[derive(Debug, Clone)]
pub struct TreeIndex {
    /// Records sorted by path, placeholders included
    pub records: Vec<FileRecord>,
    pub source: IndexSource,
}

/// Run the match → ignore → metadata pipeline without touching the cache.
pub fn scan_tree(root: &Path, opts: &IndexOptions) -> Result<Vec<FileRecord>, IndexError> {
    let matcher = PathMatcher::new(&opts.patterns)?;
    let resolver = IgnoreResolver::new(&opts.ignore)?;

    let candidates = matcher.collect(root, opts.limit, opts.threads, &opts.cancel)?;
    let candidate_count = candidates.len();

    let resolution = resolver.resolve(root, candidates);
    let mut records = extract_all(root, &resolution.kept);

    if opts.cancel.is_cancelled() {
        return Err(FsError::Cancelled.into());
    }

    records.extend(resolution.placeholders);
    records.sort_by(|a, b| a.path.cmp(&b.path));
    records.dedup_by(|a, b| a.path == b.path);

    info!(
        "[scan] {:?}: {} candidates, {} records",
        root,
        candidate_count,
        records.len()
    );

    Ok(records)
}

/// Return the index for `root`, from the sentinel cache when allowed,
/// otherwise by scanning (and refreshing the cache if caching is on).
///
/// A cache that fails to parse is treated as a miss and rebuilt.
pub fn ensure_index(root: &Path, opts: &IndexOptions) -> Result<TreeIndex, IndexError> {
    if opts.use_cache && !opts.force_rebuild {
        match load_cache(root) {
            Ok(Some(records)) => {
                return Ok(TreeIndex {
                    records,
                    source: IndexSource::Cache,
                });
            }
            Ok(None) => debug!("[index] no cache under {:?}, scanning", root),
            Err(e @ (IndexError::CacheCorrupt { .. } | IndexError::CacheRead { .. })) => {
                warn!("[index] {e}; rebuilding");
            }
            Err(e) => return Err(e),
        }
    }

    let records = scan_tree(root, opts)?;

    if opts.use_cache {
        store_cache(root, &records)?;
    }

    Ok(TreeIndex {
        records,
        source: IndexSource::Scan,
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
