//! Keyed mutual exclusion
//!
//! One lock per live id, created on demand. A lock entry can be reclaimed
//! once its record is gone and no waiter holds a reference, so locks for
//! deleted ids do not accumulate indefinitely.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock-per-id map
#[derive(Debug, Default)]
pub struct LockMap {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockMap {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for an id, creating the entry if needed
    ///
    /// The returned guard keeps the underlying lock alive, so `reclaim`
    /// never frees a lock out from under a holder or waiter.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let cell = self
            .locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        cell.lock_owned().await
    }

    /// Drop the entry for an id if nothing references it anymore
    ///
    /// Call after the guard for a deleted record has been dropped. If a
    /// concurrent operation still holds or awaits the lock, the entry stays
    /// and is reclaimed by whoever finishes last.
    pub fn reclaim(&self, id: &str) {
        self.locks.remove_if(id, |_, cell| Arc::strong_count(cell) == 1);
    }

    /// Number of live lock entries
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn same_id_serializes_different_ids_do_not() {
        let locks = Arc::new(LockMap::new());
        let running = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..8 {
            let locks = locks.clone();
            let running = running.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("shared").await;
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(2)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                i
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        // never more than one holder of the same id at once
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);

        // unrelated ids are held concurrently
        let a = locks.acquire("a").await;
        let b = locks.acquire("b").await;
        drop(a);
        drop(b);
    }

    #[tokio::test]
    async fn reclaim_frees_unreferenced_entries_only() {
        let locks = LockMap::new();

        let guard = locks.acquire("id").await;
        assert_eq!(locks.len(), 1);

        // the guard still references the lock: reclaim must keep it
        locks.reclaim("id");
        assert_eq!(locks.len(), 1);

        drop(guard);
        locks.reclaim("id");
        assert!(locks.is_empty());
    }
}
