use std::{io, path::PathBuf};

use sttree_fs::FsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),

    /// A VASP structure file could not be parsed.
    #[error("invalid structure file {}: {reason}", path.display())]
    Structure { path: PathBuf, reason: String },

    #[error("cannot build artifacts url: {0}")]
    Url(#[from] url::ParseError),
}
