mod capability;
mod crystal;
mod dispatch;
mod error;
mod sniff;

pub use capability::{Capability, EXTENSION_TABLE, normalize_extension};
pub use crystal::{Structure, companion_path, ensure_companion, is_crystal_basename};
pub use dispatch::{PreviewConfig, PreviewDispatcher, PreviewOutcome, PreviewPlan};
pub use error::PreviewError;
pub use sniff::{is_text, read_sample, sniff_media};
