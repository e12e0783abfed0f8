// Populating this from a file or environment is the adapter's job, not
// this crate's -- only the typed carrier lives here.

use std::path::PathBuf;

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub memory_limit_bytes: u64,
    // Reserved for future range-granular caching; no behavioral effect
    // in this core.
    pub chunk_size_bytes: u64,
    pub root: Option<PathBuf>,
    pub adaptive: bool,
    pub predictor: PredictorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_limit_bytes: 4 * GIB,
            chunk_size_bytes: MIB,
            root: None,
            adaptive: false,
            predictor: PredictorConfig::default(),
        }
    }
}

impl Config {
    pub fn new(memory_limit_bytes: u64, chunk_size_bytes: u64) -> Self {
        Self {
            memory_limit_bytes,
            chunk_size_bytes,
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_adaptive(mut self, predictor: PredictorConfig) -> Self {
        self.adaptive = true;
        self.predictor = predictor;
        self
    }
}

// Only consulted when Config::adaptive is true.
#[derive(Clone, Copy, Debug)]
pub struct PredictorConfig {
    pub top_k: usize,
    pub decay: f64,
    pub min_conf: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            decay: 0.9,
            min_conf: 0.05,
        }
    }
}
