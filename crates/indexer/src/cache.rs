use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::debug;
use sttree_fs::FileRecord;
use sttree_runtime::CACHE_FILE_NAME;
use tempfile::NamedTempFile;

use crate::error::IndexError;

/// Location of the sentinel cache for `root`.
#[inline]
pub fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_FILE_NAME)
}

/// Read the cached record list for `root`.
///
/// Returns `Ok(None)` when no cache exists. The content is returned as stored,
/// without checking it against the filesystem.
pub fn load_cache(root: &Path) -> Result<Option<Vec<FileRecord>>, IndexError> {
    let path = cache_path(root);

    let bytes = match fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(IndexError::CacheRead { path, source }),
    };

    let records: Vec<FileRecord> = serde_json::from_slice(&bytes)
        .map_err(|source| IndexError::CacheCorrupt { path, source })?;

    debug!("[cache] loaded {} records from {:?}", records.len(), root);
    Ok(Some(records))
}

/// Serialized cache payload, exactly as written to disk.
pub fn encode_records(records: &[FileRecord]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(records)
}

fn write_records_to(file: &File, records: &[FileRecord]) -> io::Result<()> {
    let payload = encode_records(records).map_err(io::Error::other)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&payload)?;
    writer.flush()
}

/// Atomic cache write: temp file in `root`, then rename over the sentinel.
///
/// Concurrent writers race on the rename; the last one wins and readers never
/// observe a truncated file.
pub fn store_cache(root: &Path, records: &[FileRecord]) -> Result<(), IndexError> {
    let path = cache_path(root);
    let wrap = |source: io::Error| IndexError::CacheWrite {
        path: path.clone(),
        source,
    };

    let tmp = NamedTempFile::new_in(root).map_err(wrap)?;

    write_records_to(tmp.as_file(), records).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;

    tmp.persist(&path).map_err(|e| wrap(e.error))?;

    #[cfg(unix)]
    {
        if let Ok(dir) = File::open(root) {
            let _ = dir.sync_all();
        }
    }

    debug!("[cache] wrote {} records to {:?}", records.len(), path);
    Ok(())
}

/// Remove the sentinel cache. Returns whether a file was removed.
pub fn clear_cache(root: &Path) -> Result<bool, IndexError> {
    let path = cache_path(root);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(IndexError::CacheWrite { path, source }),
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
