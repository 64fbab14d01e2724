use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::Serialize;
use sttree_fs::{FileRecord, extract_record};
use sttree_runtime::{ARTIFACTS_SEGMENT, DEFAULT_SUPERCELL, SNIFF_SAMPLE_LEN};
use url::Url;

use crate::{
    capability::{Capability, lookup_static, normalize_extension},
    crystal::{ensure_companion, is_crystal_basename},
    error::PreviewError,
    sniff::{is_text, read_sample, sniff_media},
};

#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Remote mirror; files resolve to `<site>/artifacts/<path>`
    pub artifacts_site: Option<Url>,
    /// Per-call extension overrides, consulted before the static table
    pub overrides: HashMap<String, Capability>,
    pub supercell: [u32; 3],
    /// Bytes read for content sniffing and the text heuristic
    pub sample_len: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            artifacts_site: None,
            overrides: HashMap::new(),
            supercell: DEFAULT_SUPERCELL,
            sample_len: SNIFF_SAMPLE_LEN,
        }
    }
}

impl PreviewConfig {
    pub fn with_override(mut self, ext: &str, capability: Capability) -> Self {
        self.overrides.insert(normalize_extension(ext), capability);
        self
    }
}

/// What the external renderer needs to show one file.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewPlan {
    /// The record actually previewed (a crystal companion replaces its source)
    pub record: FileRecord,
    pub capability: Option<Capability>,
    /// MIME type when the capability came from content sniffing
    pub mime: Option<String>,
    pub local_path: PathBuf,
    pub remote_url: Option<Url>,
    /// Whether a secondary raw-text view should be offered
    pub raw_text: bool,
}

/// Per-file result; failures stay scoped to the file.
#[derive(Debug)]
pub enum PreviewOutcome {
    Ready(PreviewPlan),
    Unavailable {
        path: String,
        extension: Option<String>,
    },
    Failed {
        path: String,
        message: String,
    },
}

pub struct PreviewDispatcher {
    config: PreviewConfig,
}

impl PreviewDispatcher {
    pub fn new(config: PreviewConfig) -> Self {
        PreviewDispatcher { config }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Override map first, then the static table.
    pub fn lookup_extension(&self, ext: &str) -> Option<Capability> {
        let ext = normalize_extension(ext);
        self.config
            .overrides
            .get(&ext)
            .copied()
            .or_else(|| lookup_static(&ext))
    }

    pub fn remote_url(&self, record: &FileRecord) -> Result<Option<Url>, PreviewError> {
        match &self.config.artifacts_site {
            Some(site) => Ok(Some(site.join(ARTIFACTS_SEGMENT)?.join(&record.path)?)),
            None => Ok(None),
        }
    }

    /// Choose a capability for `record`: crystal rewrite, extension table,
    /// magic bytes (image, video, audio), then the text fallback.
    /// Directory placeholders never get a capability.
    pub fn dispatch(&self, root: &Path, record: &FileRecord) -> Result<PreviewPlan, PreviewError> {
        if record.is_placeholder() {
            return Ok(PreviewPlan {
                record: record.clone(),
                capability: None,
                mime: None,
                local_path: root.join(&record.path),
                remote_url: self.remote_url(record)?,
                raw_text: false,
            });
        }

        let record = if is_crystal_basename(&record.name) {
            let companion = ensure_companion(&root.join(&record.path), self.config.supercell)?;
            extract_record(root, &companion)?
        } else {
            record.clone()
        };

        let local_path = root.join(&record.path);
        let remote_url = self.remote_url(&record)?;

        let sample =
            read_sample(&local_path, self.config.sample_len).map_err(|source| PreviewError::Io {
                path: local_path.clone(),
                source,
            })?;
        let raw_text = is_text(&sample);

        let (capability, mime) = if let Some(cap) = record
            .extension()
            .and_then(|ext| self.lookup_extension(&ext))
        {
            (Some(cap), None)
        } else if let Some((cap, mime)) = sniff_media(&sample) {
            (Some(cap), Some(mime.to_owned()))
        } else if raw_text {
            (Some(Capability::Text), None)
        } else {
            (None, None)
        };

        debug!(
            "[preview] {} -> {:?} (raw text: {raw_text})",
            record.path, capability
        );

        Ok(PreviewPlan {
            record,
            capability,
            mime,
            local_path,
            remote_url,
            raw_text,
        })
    }

    /// Like [`dispatch`](Self::dispatch), but never fails: errors become a
    /// scoped `Failed` notice for this file only.
    pub fn preview(&self, root: &Path, record: &FileRecord) -> PreviewOutcome {
        match self.dispatch(root, record) {
            Ok(plan) if plan.capability.is_some() => PreviewOutcome::Ready(plan),
            Ok(plan) => {
                let extension = plan.record.extension();
                PreviewOutcome::Unavailable {
                    path: plan.record.path,
                    extension,
                }
            }
            Err(e) => {
                warn!("[preview] failed preview {}: {e}", record.path);
                PreviewOutcome::Failed {
                    path: record.path.clone(),
                    message: e.to_string(),
                }
            }
        }
    }
}

impl Default for PreviewDispatcher {
    fn default() -> Self {
        Self::new(PreviewConfig::default())
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
