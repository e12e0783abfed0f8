// Single worker hydrating the backing directory into the LRU store.
// queue + notify play the role of a condition variable; both are held
// only across enqueue/dequeue bookkeeping, never across file I/O.

use crate::error::HydrateError;
use crate::store::{CacheBuffer, LruStore};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Shared {
    queue: Mutex<VecDeque<String>>,
    notify: Notify,
    shutdown: AtomicBool,
    root: RwLock<Option<PathBuf>>,
    store: Arc<LruStore>,
}

pub struct AsyncReader {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncReader {
    pub fn spawn(store: Arc<LruStore>, root: Option<PathBuf>) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
            root: RwLock::new(root),
            store,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = tokio::spawn(async move { Self::run(worker_shared).await });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    // Does not affect work already queued or in flight.
    pub fn set_root(&self, root: impl Into<PathBuf>) {
        *self.shared.root.write() = Some(root.into());
    }

    // Dropped silently once shutdown has been requested.
    pub fn enqueue(&self, path: impl Into<String>) {
        if self.shared.shutdown.load(Ordering::Acquire) {
            tracing::debug!("enqueue after shutdown, dropping");
            return;
        }
        self.shared.queue.lock().push_back(path.into());
        self.shared.notify.notify_one();
    }

    pub fn pending(&self) -> Vec<String> {
        self.shared.queue.lock().iter().cloned().collect()
    }

    pub async fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.notify.notify_one();
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
    }

    async fn run(shared: Arc<Shared>) {
        loop {
            let next = shared.queue.lock().pop_front();

            let path = match next {
                Some(path) => path,
                None => {
                    if shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    shared.notify.notified().await;
                    continue;
                }
            };

            // Single-flight: another hydration may already have landed.
            if shared.store.contains(&path) {
                continue;
            }

            let root = shared.root.read().clone();
            let Some(root) = root else {
                tracing::warn!(path = %path, "no backing root configured, skipping");
                continue;
            };

            match Self::hydrate(&root, &path).await {
                Ok(buffer) => shared.store.insert(&path, buffer),
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "hydration failed");
                }
            }
        }
    }

    async fn hydrate(root: &Path, path: &str) -> Result<CacheBuffer, HydrateError> {
        let full_path = root.join(path);

        let metadata = tokio::fs::metadata(&full_path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                HydrateError::NotFound(full_path.clone())
            } else {
                HydrateError::Io {
                    path: full_path.clone(),
                    source,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(HydrateError::NotRegularFile(full_path));
        }

        let expected = metadata.len();
        let contents = tokio::fs::read(&full_path)
            .await
            .map_err(|source| HydrateError::Io {
                path: full_path.clone(),
                source,
            })?;

        if (contents.len() as u64) < expected {
            return Err(HydrateError::ShortRead {
                path: full_path,
                expected,
                got: contents.len(),
            });
        }

        Ok(Arc::from(contents.into_boxed_slice()))
    }
}

impl Drop for AsyncReader {
    fn drop(&mut self) {
        // Best-effort: if the caller never called `shutdown`, make sure the
        // worker at least stops pulling new work once this handle is gone.
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}
