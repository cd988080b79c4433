//! Per-task serialization of remote operations.
//!
//! Each task id maps to an async mutex held for the whole duration of an
//! operation on that task. A create holds the lock of its temp id, so a toggle
//! or delete addressed to that temp id waits until the create settles. After
//! promotion the real id shares the same mutex and the temp id resolves to it.
//!
//! A mutex lives in the table only while someone holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct EntityLocks {
    table: Arc<StdMutex<LockTable>>,
}

#[derive(Debug, Default)]
struct LockTable {
    locks: HashMap<String, Arc<Mutex<()>>>,
    aliases: HashMap<String, String>,
}

impl LockTable {
    fn resolve(&self, id: &str) -> String {
        self.aliases.get(id).cloned().unwrap_or_else(|| id.to_string())
    }
}

/// Exclusive access to one task; releasing it prunes the lock when idle.
pub(crate) struct EntityGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
    table: Arc<StdMutex<LockTable>>,
}

impl Drop for EntityGuard {
    fn drop(&mut self) {
        let mut table = lock_table(&self.table);
        self.guard.take();

        // Table entries plus our own handle; any waiter holds one more
        let keys: Vec<String> = table
            .locks
            .iter()
            .filter(|(_, lock)| Arc::ptr_eq(lock, &self.lock))
            .map(|(key, _)| key.clone())
            .collect();
        if Arc::strong_count(&self.lock) == keys.len() + 1 {
            for key in keys {
                table.locks.remove(&key);
            }
        }
    }
}

fn lock_table(table: &StdMutex<LockTable>) -> MutexGuard<'_, LockTable> {
    // The table stays consistent even if a holder panicked
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EntityLocks {
    /// Wait for exclusive access to `id`.
    pub async fn acquire(&self, id: &str) -> EntityGuard {
        let lock = {
            let mut table = lock_table(&self.table);
            let key = table.resolve(id);
            table.locks.entry(key).or_default().clone()
        };
        let guard = lock.clone().lock_owned().await;
        EntityGuard {
            guard: Some(guard),
            lock,
            table: self.table.clone(),
        }
    }

    /// Map `temp_id` to `real_id`; both now share one lock.
    pub fn alias(&self, temp_id: &str, real_id: &str) {
        let mut table = lock_table(&self.table);
        let lock = table.locks.entry(temp_id.to_string()).or_default().clone();
        table.locks.insert(real_id.to_string(), lock);
        table.aliases.insert(temp_id.to_string(), real_id.to_string());
    }

    /// The id an operation addressed to `id` should act on.
    pub fn resolve(&self, id: &str) -> String {
        lock_table(&self.table).resolve(id)
    }

    /// Drop bookkeeping for a task that no longer exists.
    ///
    /// Holders and waiters keep their own handle on the mutex.
    pub fn forget(&self, id: &str) {
        let mut table = lock_table(&self.table);
        let temps: Vec<String> = table
            .aliases
            .iter()
            .filter(|(_, real)| real.as_str() == id)
            .map(|(temp, _)| temp.clone())
            .collect();
        for temp in &temps {
            table.locks.remove(temp);
            table.aliases.remove(temp);
        }
        table.locks.remove(id);
        table.aliases.remove(id);
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        lock_table(&self.table).locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn released_locks_are_pruned() {
        let locks = EntityLocks::default();
        for round in 0..50 {
            let _guard = locks.acquire(&format!("task-{}", round % 5)).await;
            assert_eq!(locks.tracked(), 1);
        }
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn lock_with_waiter_survives_release() {
        let locks = Arc::new(EntityLocks::default());
        let first = locks.acquire("a").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("a").await;
                locks.tracked()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(waiter.await.unwrap(), 1);
        assert_eq!(locks.tracked(), 0);
    }

    #[tokio::test]
    async fn alias_routes_temp_id_to_real_lock() {
        let locks = EntityLocks::default();
        let guard = locks.acquire("tmp-1").await;
        locks.alias("tmp-1", "r1");
        assert_eq!(locks.resolve("tmp-1"), "r1");
        assert_eq!(locks.tracked(), 2);
        drop(guard);
        assert_eq!(locks.tracked(), 0);

        // Still resolves after pruning, and shares the real id's lock
        let _real = locks.acquire("r1").await;
        assert!(tokio::time::timeout(Duration::from_millis(20), locks.acquire("tmp-1"))
            .await
            .is_err());
    }
}
