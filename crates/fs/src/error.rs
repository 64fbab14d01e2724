use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// Root or a resolved entry does not exist (or the root is not a directory).
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A glob inclusion pattern or an ignore regex failed to compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },

    /// The scan was abandoned through its cancel token.
    #[error("scan cancelled")]
    Cancelled,

    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an I/O error for `path`, folding `NotFound` into its own variant.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            FsError::NotFound { path }
        } else {
            FsError::Io { path, source }
        }
    }

    pub(crate) fn pattern(pattern: &str, reason: impl ToString) -> Self {
        FsError::Pattern {
            pattern: pattern.to_owned(),
            reason: reason.to_string(),
        }
    }
}
