use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::FsError,
    metadata::{base_name, placeholder_record, relative_path},
    record::FileRecord,
};

/// One ignore rule, tested against a candidate's base name.
///
/// In JSON a bare string is an `Exact` rule and `{"pattern": "..."}` is a
/// `Pattern` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnoreRule {
    /// Rejects names containing this string
    Exact(String),
    /// Rejects names matching this regex, anchored at the start of the name
    Pattern { pattern: String },
}

impl IgnoreRule {
    pub fn exact(s: impl Into<String>) -> Self {
        IgnoreRule::Exact(s.into())
    }

    pub fn pattern(p: impl Into<String>) -> Self {
        IgnoreRule::Pattern { pattern: p.into() }
    }
}

/// Ordered ignore rules, either as a bare list or with the retain-parent flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnoreRuleSet {
    Rules(Vec<IgnoreRule>),
    Structured {
        #[serde(default, alias = "retainParent")]
        retain_parent: bool,
        #[serde(default)]
        rules: Vec<IgnoreRule>,
    },
}

impl Default for IgnoreRuleSet {
    fn default() -> Self {
        IgnoreRuleSet::Rules(Vec::new())
    }
}

impl IgnoreRuleSet {
    pub fn new(rules: Vec<IgnoreRule>, retain_parent: bool) -> Self {
        if retain_parent {
            IgnoreRuleSet::Structured {
                retain_parent,
                rules,
            }
        } else {
            IgnoreRuleSet::Rules(rules)
        }
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        match self {
            IgnoreRuleSet::Rules(rules) | IgnoreRuleSet::Structured { rules, .. } => rules,
        }
    }

    pub fn retain_parent(&self) -> bool {
        matches!(
            self,
            IgnoreRuleSet::Structured {
                retain_parent: true,
                ..
            }
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rules().is_empty()
    }
}

enum CompiledRule {
    Exact(String),
    Pattern(Regex),
}

impl CompiledRule {
    fn compile(rule: &IgnoreRule) -> Result<Self, FsError> {
        match rule {
            IgnoreRule::Exact(s) => Ok(CompiledRule::Exact(s.clone())),
            IgnoreRule::Pattern { pattern } => Regex::new(&format!("^(?:{pattern})"))
                .map(CompiledRule::Pattern)
                .map_err(|e| FsError::pattern(pattern, e)),
        }
    }

    #[inline]
    fn rejects(&self, name: &str) -> bool {
        match self {
            CompiledRule::Exact(s) => name.contains(s.as_str()),
            CompiledRule::Pattern(re) => re.is_match(name),
        }
    }
}

/// Output of [`IgnoreResolver::resolve`].
#[derive(Debug, Default)]
pub struct Resolution {
    /// Candidates that passed every rule, in input order
    pub kept: Vec<PathBuf>,
    /// Directory records for parents left without a surviving direct child
    pub placeholders: Vec<FileRecord>,
}

/// Applies an [`IgnoreRuleSet`] to a candidate list.
pub struct IgnoreResolver {
    rules: Vec<CompiledRule>,
    retain_parent: bool,
}

impl IgnoreResolver {
    pub fn new(set: &IgnoreRuleSet) -> Result<Self, FsError> {
        let rules = set
            .rules()
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IgnoreResolver {
            rules,
            retain_parent: set.retain_parent(),
        })
    }

    /// First matching rule wins; a name is ignored if any rule rejects it.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.rejects(name))
    }

    pub fn resolve(&self, root: &Path, candidates: Vec<PathBuf>) -> Resolution {
        if self.rules.is_empty() {
            return Resolution {
                kept: candidates,
                placeholders: Vec::new(),
            };
        }

        // Pass 1: partition, tracking per parent dir whether any direct child
        // survived. Only populated in retain-parent mode.
        let mut survived: BTreeMap<String, bool> = BTreeMap::new();
        let mut kept = Vec::with_capacity(candidates.len());

        for path in candidates {
            let Some(rel) = relative_path(root, &path) else {
                continue;
            };
            let name = base_name(&rel);
            let parent = rel.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

            if self.is_ignored(name) {
                if self.retain_parent {
                    survived.entry(parent.to_owned()).or_insert(false);
                }
            } else {
                if self.retain_parent {
                    survived.insert(parent.to_owned(), true);
                }
                kept.push(path);
            }
        }

        // Pass 2: dirs touched by a rejection and still without a survivor.
        let placeholders: Vec<FileRecord> = survived
            .iter()
            .filter(|(dir, has_survivor)| !**has_survivor && !dir.is_empty())
            .map(|(dir, _)| placeholder_record(root, dir))
            .collect();

        debug!(
            "[ignore] kept {} candidates, {} placeholders",
            kept.len(),
            placeholders.len()
        );

        Resolution { kept, placeholders }
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
