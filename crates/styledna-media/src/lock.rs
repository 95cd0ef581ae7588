//! Process-wide keyed mutual exclusion.
//!
//! Serializes work on a single remote resource (keyed by source id) while
//! leaving distinct resources fully parallel. Entries are created lazily
//! and retained for the process lifetime; the key space is bounded by the
//! set of distinct source ids actually requested.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-key async mutexes.
#[derive(Debug, Default)]
pub struct ResourceLock {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ResourceLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, waiting if another caller holds it.
    ///
    /// The per-key mutex is created on first use with an atomic
    /// get-or-insert under the registry lock, so two callers racing on a
    /// brand-new key always end up contending on the same mutex.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().expect("lock registry poisoned");
            Arc::clone(
                entries
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };

        entry.lock_owned().await
    }

    /// Number of keys ever locked (entries are never evicted).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
