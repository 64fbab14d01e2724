use std::{
    fs::{self, read_dir},
    ops::ControlFlow,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use ignore::WalkBuilder;
use log::{debug, warn};
use sttree_runtime::WALK_BATCH_SIZE;

use crate::error::FsError;

/// Shared flag used to abandon a scan from another thread (e.g. a timeout).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Bookkeeping shared by all parallel workers.
struct WalkState<'a> {
    /// Directories queued or in progress
    pending: AtomicUsize,
    /// Match slots handed out so far, may overshoot `limit`
    matched: AtomicUsize,
    limit: usize,
    cancel: &'a CancelToken,
}

impl WalkState<'_> {
    /// Reserve one of the `limit` global match slots.
    #[inline]
    fn claim(&self) -> bool {
        self.matched.fetch_add(1, Ordering::AcqRel) < self.limit
    }

    #[inline]
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.matched.load(Ordering::Acquire) >= self.limit
    }
}

/// Deterministic single-threaded walk of `root`.
///
/// Entries are visited sorted by file name; `visit` receives every file
/// (including symlinks that resolve to files) and may break to stop early.
pub fn walk_sequential<F>(root: &Path, cancel: &CancelToken, mut visit: F) -> Result<(), FsError>
where
    F: FnMut(PathBuf) -> ControlFlow<()>,
{
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        if cancel.is_cancelled() {
            return Err(FsError::Cancelled);
        }

        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("[walk] skipping unreadable entry under {:?}: {e}", root);
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if is_candidate_file(entry.path(), file_type) && visit(entry.into_path()).is_break() {
            break;
        }
    }

    Ok(())
}

/// Multi-threaded walk using a crossbeam work queue, one directory per item.
///
/// `accept` decides whether a file is a match; matches are batched into
/// `file_tx`. At most `limit` matches are sent across all workers combined.
/// Output order follows worker scheduling, callers sort if they need
/// stability.
pub fn walk_parallel<F>(
    root: &Path,
    file_tx: Sender<Vec<PathBuf>>,
    accept: F,
    limit: usize,
    num_threads: usize,
    cancel: &CancelToken,
) -> Result<(), FsError>
where
    F: Fn(&Path) -> bool + Sync,
{
    if limit == 0 {
        return Ok(());
    }

    let (work_tx, work_rx) = channel::unbounded::<PathBuf>();

    let state = WalkState {
        pending: AtomicUsize::new(1),
        matched: AtomicUsize::new(0),
        limit,
        cancel,
    };

    let _ = work_tx.send(root.to_path_buf());

    let num_threads = num_threads.max(1);
    debug!("[walk_parallel] starting with {} threads", num_threads);

    thread::scope(|s| {
        for _ in 0..num_threads {
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let file_tx = file_tx.clone();
            let state = &state;
            let accept = &accept;

            s.spawn(move || worker_loop(work_rx, work_tx, file_tx, accept, state));
        }
    });

    if cancel.is_cancelled() {
        return Err(FsError::Cancelled);
    }

    Ok(())
}

fn worker_loop<F>(
    work_rx: channel::Receiver<PathBuf>,
    work_tx: Sender<PathBuf>,
    file_tx: Sender<Vec<PathBuf>>,
    accept: &F,
    state: &WalkState<'_>,
) where
    F: Fn(&Path) -> bool + Sync,
{
    let mut batch = Vec::with_capacity(WALK_BATCH_SIZE);

    loop {
        match work_rx.recv_timeout(Duration::from_millis(20)) {
            Ok(dir) => {
                if !state.should_stop() {
                    scan_dir(&dir, &work_tx, &mut batch, accept, state);
                }

                if batch.len() >= WALK_BATCH_SIZE {
                    let to_send = std::mem::take(&mut batch);
                    if file_tx.send(to_send).is_err() {
                        return;
                    }
                }

                if state.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if state.pending.load(Ordering::Acquire) == 0 || state.should_stop() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if !batch.is_empty() {
        let _ = file_tx.send(batch);
    }
}

/// Read one directory: queue its subdirectories, batch accepted files.
fn scan_dir<F>(
    dir: &Path,
    work_tx: &Sender<PathBuf>,
    batch: &mut Vec<PathBuf>,
    accept: &F,
    state: &WalkState<'_>,
) where
    F: Fn(&Path) -> bool + Sync,
{
    let rd = match read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            warn!("[walk] read_dir({:?}) failed: {e}", dir);
            return;
        }
    };

    for entry_res in rd {
        if state.should_stop() {
            return;
        }

        let entry = match entry_res {
            Ok(e) => e,
            Err(e) => {
                warn!("[walk] error reading entry in {:?}: {e}", dir);
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                debug!("[walk] entry vanished in {:?}: {e}", dir);
                continue;
            }
        };

        let path = entry.path();

        if file_type.is_dir() {
            state.pending.fetch_add(1, Ordering::AcqRel);
            let _ = work_tx.send(path);
        } else if is_candidate_file(&path, file_type) && accept(&path) {
            if !state.claim() {
                return;
            }
            batch.push(path);
        }
    }
}

/// Regular files, plus symlinks whose target is a regular file.
fn is_candidate_file(path: &Path, file_type: fs::FileType) -> bool {
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink() && fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
