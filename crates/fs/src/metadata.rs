use std::{
    fs::{self, Metadata},
    path::{Component, Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};

use crate::{error::FsError, record::FileRecord};

/// Root-relative form of `path` with `/` separators, or `None` when `path`
/// is not under `root`, climbs out through `..`, or is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;

    let mut out = String::new();
    for component in rel.components() {
        let part = match component {
            Component::Normal(part) => part,
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        };
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(part.to_str()?);
    }

    (!out.is_empty()).then_some(out)
}

/// Stat `path` and build its record relative to `root`.
///
/// Fails with `NotFound` when the entry vanished after it was discovered.
pub fn extract_record(root: &Path, path: &Path) -> Result<FileRecord, FsError> {
    let metadata = fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;

    let rel = relative_path(root, path).ok_or_else(|| FsError::NotFound {
        path: path.to_path_buf(),
    })?;
    let name = base_name(&rel).to_owned();

    let (create_time, update_time, access_time) = timestamps_millis(&metadata);

    Ok(FileRecord {
        path: rel,
        name,
        size: metadata.len(),
        create_time,
        update_time,
        access_time,
    })
}

/// Build records for `paths`, dropping entries that vanished mid-scan.
pub fn extract_all(root: &Path, paths: &[PathBuf]) -> Vec<FileRecord> {
    paths
        .iter()
        .filter_map(|path| match extract_record(root, path) {
            Ok(rec) => Some(rec),
            Err(FsError::NotFound { path }) => {
                debug!("[metadata] {:?} vanished before stat, skipping", path);
                None
            }
            Err(e) => {
                warn!("[metadata] skipping {:?}: {e}", path);
                None
            }
        })
        .collect()
}

/// Synthesize the directory record kept visible by retain-parent mode.
///
/// Timestamps come from the directory itself when it can still be read.
pub fn placeholder_record(root: &Path, rel_dir: &str) -> FileRecord {
    let (create_time, update_time, access_time) = fs::metadata(root.join(rel_dir))
        .map(|m| timestamps_millis(&m))
        .unwrap_or((0, 0, 0));

    FileRecord {
        path: format!("{rel_dir}/"),
        name: base_name(rel_dir).to_owned(),
        size: 0,
        create_time,
        update_time,
        access_time,
    }
}

pub(crate) fn base_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// (create, update, access) in milliseconds since the epoch.
fn timestamps_millis(metadata: &Metadata) -> (u64, u64, u64) {
    (
        change_time_millis(metadata),
        to_unix_millis(metadata.modified().ok()),
        to_unix_millis(metadata.accessed().ok()),
    )
}

#[cfg(unix)]
fn change_time_millis(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;

    let secs = u64::try_from(metadata.ctime()).unwrap_or(0);
    let nanos = u64::try_from(metadata.ctime_nsec()).unwrap_or(0);
    secs * 1000 + nanos / 1_000_000
}

#[cfg(not(unix))]
fn change_time_millis(metadata: &Metadata) -> u64 {
    to_unix_millis(metadata.created().ok())
}

fn to_unix_millis(t: Option<SystemTime>) -> u64 {
    t.and_then(|tt| tt.duration_since(UNIX_EPOCH).ok())
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
