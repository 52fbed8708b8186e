use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// In-process lock table keyed by destination folder.
///
/// Two batches targeting the same folder run one after the other, so neither
/// can observe "no existing file" while the other is writing it. An entry
/// lives only while some batch holds or waits for it.
#[derive(Debug, Default)]
pub struct PathLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock<R>(&self, path: &Path, f: impl FnOnce() -> R) -> R {
        let key = normalize(path);
        // Clone the Arc out so the shard lock is released before we block.
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            trace!("Holding placement lock for {}", path.display());
            f()
        };
        drop(lock);
        // Waiters clone under the shard lock, so a count of 1 means nobody else
        // can reach this entry.
        self.locks
            .remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Lexical normalization: drops `.` components and trailing separators.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
