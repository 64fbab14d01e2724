mod error;
mod matcher;
mod metadata;
mod record;
mod rules;
mod walker;

pub use error::FsError;
pub use matcher::PathMatcher;
pub use metadata::{extract_all, extract_record, placeholder_record, relative_path};
pub use record::FileRecord;
pub use rules::{IgnoreResolver, IgnoreRule, IgnoreRuleSet, Resolution};
pub use walker::{CancelToken, walk_parallel, walk_sequential};
