mod config;
pub mod logging;

pub use config::{
    ARTIFACTS_SEGMENT, CACHE_FILE_NAME, CRYSTAL_BASENAMES, CRYSTAL_COMPANION_EXT,
    DEFAULT_GLOB_PATTERN, DEFAULT_LIMIT, DEFAULT_SUPERCELL, PROGRAM_LOG_FILE, PROGRAM_LOG_LEVEL,
    PROGRAM_NAME, SNIFF_SAMPLE_LEN, WALK_BATCH_SIZE,
};

pub use logging::init;
