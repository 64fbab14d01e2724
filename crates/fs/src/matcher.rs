use std::{
    fs,
    ops::ControlFlow,
    path::{Path, PathBuf},
    thread,
};

use crossbeam::channel;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::debug;
use sttree_runtime::{CACHE_FILE_NAME, DEFAULT_GLOB_PATTERN};

use crate::{
    error::FsError,
    metadata::relative_path,
    walker::{CancelToken, walk_parallel, walk_sequential},
};

/// Compiled set of glob inclusion patterns, matched against root-relative
/// paths with `/` separators.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl PathMatcher {
    /// Compile `patterns`; an empty list falls back to the recursive-all pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, FsError> {
        let patterns: Vec<String> = if patterns.is_empty() {
            vec![DEFAULT_GLOB_PATTERN.to_owned()]
        } else {
            patterns.iter().map(|p| p.as_ref().to_owned()).collect()
        };

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| FsError::pattern(pattern, e.kind()))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| FsError::pattern(e.glob().unwrap_or_default(), e.kind()))?;

        Ok(PathMatcher { patterns, set })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a root-relative path matches any inclusion pattern.
    #[inline]
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }

    fn accepts(&self, root: &Path, path: &Path) -> bool {
        match relative_path(root, path) {
            Some(rel) => rel != CACHE_FILE_NAME && self.matches(&rel),
            None => {
                debug!("[matcher] skipping {:?}: no utf-8 path relative to root", path);
                false
            }
        }
    }

    /// Collect absolute paths of files under `root` matching any pattern,
    /// stopping after `limit` matches.
    ///
    /// With `threads <= 1` the walk is sequential and sorted by name, so the
    /// candidate set is stable for a fixed tree. With more threads the limit is
    /// still global but which entries win the race under truncation is not.
    /// The returned list is always sorted.
    pub fn collect(
        &self,
        root: &Path,
        limit: usize,
        threads: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>, FsError> {
        ensure_root_dir(root)?;

        let mut found = if threads <= 1 {
            self.collect_sequential(root, limit, cancel)?
        } else {
            self.collect_parallel(root, limit, threads, cancel)?
        };

        found.sort();
        debug!(
            "[matcher] {} candidates under {:?} (limit {limit})",
            found.len(),
            root
        );
        Ok(found)
    }

    fn collect_sequential(
        &self,
        root: &Path,
        limit: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>, FsError> {
        let mut found = Vec::new();
        if limit == 0 {
            return Ok(found);
        }

        walk_sequential(root, cancel, |path| {
            if self.accepts(root, &path) {
                found.push(path);
                if found.len() >= limit {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })?;

        Ok(found)
    }

    fn collect_parallel(
        &self,
        root: &Path,
        limit: usize,
        threads: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<PathBuf>, FsError> {
        let (file_tx, file_rx) = channel::unbounded::<Vec<PathBuf>>();

        let walk_result = thread::scope(|s| {
            let walker = s.spawn(|| {
                walk_parallel(
                    root,
                    file_tx,
                    |path| self.accepts(root, path),
                    limit,
                    threads,
                    cancel,
                )
            });

            let mut found = Vec::new();
            while let Ok(batch) = file_rx.recv() {
                found.extend(batch);
            }

            walker.join().map(|res| res.map(|()| found))
        });

        match walk_result {
            Ok(res) => res,
            Err(_) => Err(FsError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::other("filesystem walker thread panicked"),
            }),
        }
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        PathMatcher::new(&[DEFAULT_GLOB_PATTERN]).expect("compile default glob pattern")
    }
}

fn ensure_root_dir(root: &Path) -> Result<(), FsError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FsError::NotFound {
            path: root.to_path_buf(),
        }),
        Err(e) => Err(FsError::from_io(root, e)),
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
