use crate::config::Config;
use crate::path::normalize;
use crate::predictor::Predictor;
use crate::reader::AsyncReader;
use crate::store::LruStore;
use std::path::PathBuf;
use std::sync::Arc;

// token is an opaque marker (the normalized path); no content-addressing
// guarantee implied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupResult {
    pub present: bool,
    pub token: String,
}

pub struct CacheManager {
    store: Arc<LruStore>,
    reader: AsyncReader,
    predictor: Predictor,
    chunk_size_bytes: u64,
}

impl CacheManager {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(LruStore::new(config.memory_limit_bytes));
        let reader = AsyncReader::spawn(Arc::clone(&store), config.root.clone());
        let predictor = Predictor::new(config.adaptive, config.predictor);

        tracing::info!(
            memory_limit_bytes = config.memory_limit_bytes,
            chunk_size_bytes = config.chunk_size_bytes,
            adaptive = config.adaptive,
            "cache manager started"
        );

        Self {
            store,
            reader,
            predictor,
            chunk_size_bytes: config.chunk_size_bytes,
        }
    }

    // Advisory, reserved for future range-granular caching.
    pub fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_bytes
    }

    pub fn set_root(&self, root: impl Into<PathBuf>) {
        self.reader.set_root(root);
    }

    // Explicit request is always enqueued first; predicted candidates
    // follow behind it.
    pub fn request(&self, path: &str) {
        let normalized = normalize(path);
        self.reader.enqueue(normalized.clone());

        self.predictor.observe(&normalized);
        let candidates = self.predictor.predict();
        if candidates.is_empty() {
            return;
        }

        let already_queued = self.reader.pending();
        for candidate in candidates {
            if candidate == normalized {
                continue;
            }
            if self.store.contains(&candidate) || already_queued.contains(&candidate) {
                continue;
            }
            self.reader.enqueue(candidate);
        }
    }

    pub fn lookup(&self, path: &str) -> LookupResult {
        let normalized = normalize(path);
        let present = self.store.contains(&normalized);
        LookupResult {
            present,
            token: normalized,
        }
    }

    // None if not resident. Empty if offset is at or past the buffer's end.
    pub fn read_range(&self, path: &str, length: u64, offset: u64) -> Option<Vec<u8>> {
        let normalized = normalize(path);
        let buffer = self.store.get(&normalized)?;
        let buffer_len = buffer.len() as u64;

        if offset >= buffer_len {
            return Some(Vec::new());
        }

        let end = (offset + length).min(buffer_len);
        Some(buffer[offset as usize..end as usize].to_vec())
    }

    // Format is not a stable contract.
    pub fn status(&self) -> String {
        let bytes_used = self.store.bytes_used();
        let mb_used = bytes_used as f64 / (1024.0 * 1024.0);
        let cached = self.store.cached_paths();
        let pending = self.reader.pending();

        tracing::debug!(bytes_used, cached = cached.len(), pending = pending.len(), "status");

        format!(
            "{mb_used:.2} MB used ({bytes_used} bytes)\ncached ({}): {cached:?}\npending ({}): {pending:?}",
            cached.len(),
            pending.len(),
        )
    }

    pub async fn shutdown(&mut self) {
        self.reader.shutdown().await;
    }
}
