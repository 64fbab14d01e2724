use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of viewer the presentation layer should use for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// 3-D molecule / crystal structure viewer
    Molecule,
    Json,
    Pdf,
    /// Tabular data (CSV)
    Table,
    /// Plain text
    Text,
    Image,
    Video,
    Audio,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Molecule,
        Capability::Json,
        Capability::Pdf,
        Capability::Table,
        Capability::Text,
        Capability::Image,
        Capability::Video,
        Capability::Audio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Molecule => "molecule",
            Capability::Json => "json",
            Capability::Pdf => "pdf",
            Capability::Table => "table",
            Capability::Text => "text",
            Capability::Image => "image",
            Capability::Video => "video",
            Capability::Audio => "audio",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown capability {s:?}"))
    }
}

/// Static extension table, checked in order. Extensions are lowercase
/// without the leading dot.
pub const EXTENSION_TABLE: &[(&[&str], Capability)] = &[
    (
        &["pdb", "pdbqt", "sdf", "cif", "mol", "mol2", "xyz"],
        Capability::Molecule,
    ),
    (&["json"], Capability::Json),
    (&["pdf"], Capability::Pdf),
    (&["csv"], Capability::Table),
    (&["log", "txt", "md"], Capability::Text),
];

/// `".PDB"` → `"pdb"`.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

pub(crate) fn lookup_static(ext: &str) -> Option<Capability> {
    EXTENSION_TABLE
        .iter()
        .find(|(exts, _)| exts.contains(&ext))
        .map(|(_, cap)| *cap)
}
