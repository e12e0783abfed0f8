use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

// Arc'd so a handle returned by get() stays valid past eviction.
pub type CacheBuffer = Arc<[u8]>;

struct Inner {
    // Insertion order doubles as recency order: front = least recently
    // promoted, back = most recently promoted.
    entries: IndexMap<String, CacheBuffer, FxBuildHasher>,
    used: u64,
}

pub struct LruStore {
    cap: u64,
    inner: Mutex<Inner>,
}

impl LruStore {
    pub fn new(cap: u64) -> Self {
        Self {
            cap,
            inner: Mutex::new(Inner {
                entries: IndexMap::with_hasher(FxBuildHasher::default()),
                used: 0,
            }),
        }
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    // Does not affect recency.
    pub fn contains(&self, path: &str) -> bool {
        self.inner.lock().entries.contains_key(path)
    }

    // Promotes to head on a hit.
    pub fn get(&self, path: &str) -> Option<CacheBuffer> {
        let mut inner = self.inner.lock();
        let buf = inner.entries.shift_remove(path)?;
        inner.entries.insert(path.to_string(), buf.clone());
        Some(buf)
    }

    // An entry whose own size exceeds cap is silently refused.
    pub fn insert(&self, path: &str, buffer: CacheBuffer) {
        let len = buffer.len() as u64;
        if len > self.cap {
            tracing::debug!(path, len, cap = self.cap, "entry exceeds cap, refusing admission");
            return;
        }

        let mut inner = self.inner.lock();

        if let Some(old) = inner.entries.shift_remove(path) {
            inner.used -= old.len() as u64;
        }

        while inner.used + len > self.cap {
            match inner.entries.shift_remove_index(0) {
                Some((evicted_path, evicted_buf)) => {
                    inner.used -= evicted_buf.len() as u64;
                    tracing::trace!(path = %evicted_path, "evicted from LRU store");
                }
                None => break,
            }
        }

        inner.entries.insert(path.to_string(), buffer);
        inner.used += len;
    }

    // Most-recently-promoted first.
    pub fn cached_paths(&self) -> Vec<String> {
        self.inner.lock().entries.keys().rev().cloned().collect()
    }

    pub fn bytes_used(&self) -> u64 {
        self.inner.lock().used
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
