//! Snapshot cache of the task list, used when the remote store is unreachable.

use anyhow::{Context, Result};
use log::{info, warn};
use sea_orm::TransactionTrait;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::LocalStorage;
use crate::constants::TASKS_CACHE_KEY;
use crate::repositories::CacheEntryRepository;
use crate::session::Session;
use crate::task::Task;

/// Holds exactly one serialized task list under a fixed key.
///
/// Reads never fail: a missing or undecodable snapshot is reported as `None`.
#[derive(Clone)]
pub struct LocalCache {
    storage: Arc<Mutex<LocalStorage>>,
    key: String,
}

impl LocalCache {
    /// Cache stored under the installation-wide key.
    pub fn new(storage: Arc<Mutex<LocalStorage>>) -> Self {
        Self::with_key(storage, TASKS_CACHE_KEY)
    }

    pub fn with_key(storage: Arc<Mutex<LocalStorage>>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Cache for `session`, namespaced by user id when `scope_by_user` is set
    /// and the session knows its user.
    pub fn for_session(storage: Arc<Mutex<LocalStorage>>, session: &Session, scope_by_user: bool) -> Self {
        match (scope_by_user, session.user_id()) {
            (true, Some(user_id)) => Self::with_key(storage, format!("{TASKS_CACHE_KEY}:{user_id}")),
            _ => Self::new(storage),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this snapshot belongs to a single user rather than the install.
    pub fn is_user_scoped(&self) -> bool {
        self.key != TASKS_CACHE_KEY
    }

    /// Replace the stored snapshot with `tasks`.
    pub async fn write(&self, tasks: &[Task]) -> Result<()> {
        let payload = serde_json::to_string(tasks).context("Failed to serialize task snapshot")?;

        let storage = self.storage.lock().await;
        let txn = storage.conn.begin().await?;
        CacheEntryRepository::upsert(&txn, &self.key, payload).await?;
        txn.commit().await?;

        info!("💾 Cached {} tasks under '{}'", tasks.len(), self.key);
        Ok(())
    }

    /// Last stored snapshot, or `None` if never written or corrupt.
    pub async fn read(&self) -> Option<Vec<Task>> {
        let entry = {
            let storage = self.storage.lock().await;
            match CacheEntryRepository::get(&storage.conn, &self.key).await {
                Ok(entry) => entry?,
                Err(e) => {
                    warn!("⚠️  Failed to read cache '{}': {e}", self.key);
                    return None;
                }
            }
        };

        match serde_json::from_str::<Vec<Task>>(&entry.value) {
            Ok(tasks) => Some(tasks),
            Err(e) => {
                warn!("⚠️  Ignoring corrupt cache '{}': {e}", self.key);
                None
            }
        }
    }

    /// Remove the stored snapshot.
    pub async fn clear(&self) -> Result<()> {
        let storage = self.storage.lock().await;
        CacheEntryRepository::delete(&storage.conn, &self.key).await
    }
}
