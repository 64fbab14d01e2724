pub const PROGRAM_NAME: &str = "sttree";
pub const PROGRAM_LOG_LEVEL: &str = "STTREE_LOG_LEVEL";
/// When set, log lines are appended to this file instead of stderr.
pub const PROGRAM_LOG_FILE: &str = "STTREE_LOG_FILE";

/// Reserved name of the sidecar index cache written inside the indexed root.
pub const CACHE_FILE_NAME: &str = ".st-tree.cache";

/// Recursive-all pattern used when the caller supplies none.
pub const DEFAULT_GLOB_PATTERN: &str = "**/*";

/// Upper bound on matched candidates per scan.
pub const DEFAULT_LIMIT: usize = 10_000;

/// Number of directory entries a walker worker buffers before flushing.
pub const WALK_BATCH_SIZE: usize = 64;

/// Bytes read from the head of a file for magic-number and text detection.
pub const SNIFF_SAMPLE_LEN: usize = 8192;

/// Path segment under the artifacts site that mirrors the indexed root.
pub const ARTIFACTS_SEGMENT: &str = "artifacts/";

/// VASP structure files that get routed through a generated CIF companion.
pub const CRYSTAL_BASENAMES: &[&str] = &["POSCAR", "CONTCAR"];

/// Extension appended to a crystal basename to form its companion file.
pub const CRYSTAL_COMPANION_EXT: &str = "cif";

/// Supercell expansion applied when generating the CIF companion.
pub const DEFAULT_SUPERCELL: [u32; 3] = [2, 2, 2];
