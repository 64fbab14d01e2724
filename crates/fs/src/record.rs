use serde::{Deserialize, Serialize};

/// One entry of an index result, in the shape persisted to the cache file and
/// handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Root-relative path with `/` separators; placeholders end with `/`
    pub path: String,
    /// Last path segment
    pub name: String,
    /// Size in bytes, 0 for directory placeholders
    pub size: u64,
    /// Inode change time on Unix, birth time elsewhere (ms since epoch)
    pub create_time: u64,
    /// Last modified time (ms since epoch)
    pub update_time: u64,
    /// Last accessed time (ms since epoch, may be stale under noatime mounts)
    pub access_time: u64,
}

impl FileRecord {
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Lowercase extension of `name` without the dot, e.g. `pdb`.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
