//! Task synchronization for the tasksync client.
//!
//! This module provides the [`TaskSyncController`] which owns the in-memory
//! task list for the active session and keeps it consistent with the remote
//! store:
//! - Mutations are applied to memory first and tagged as pending
//! - The matching remote call then commits the change, or the controller
//!   recovers by resyncing (add, toggle) or rolling back (delete)
//! - Every successful list fetch refreshes the [`LocalCache`] snapshot, which
//!   is read back whenever the remote store cannot be reached
//!
//! Operations never return transport failures as errors. They report what
//! happened as a [`SyncOutcome`] or [`LoadOutcome`] and leave presentation to
//! the caller.

mod locks;
pub mod state;
pub mod tasks;

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::backend::{Backend, BackendError};
use crate::config::SyncConfig;
use crate::storage::LocalCache;
use crate::task::{sort_by_priority, Task};
use locks::EntityLocks;
pub use state::{Entry, PendingOp};
use state::TaskState;

/// Errors a caller can fix by changing its request.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(String),
}

/// Where the task list came from after a [`TaskSyncController::load`].
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Fetched from the remote store and cached.
    Remote { count: usize },
    /// Remote fetch failed; the cached snapshot was used.
    Cache { count: usize, error: BackendError },
    /// Remote fetch failed and no usable snapshot exists; state untouched.
    Unchanged { error: BackendError },
}

impl LoadOutcome {
    pub fn is_remote(&self) -> bool {
        matches!(self, LoadOutcome::Remote { .. })
    }

    pub fn error(&self) -> Option<&BackendError> {
        match self {
            LoadOutcome::Remote { .. } => None,
            LoadOutcome::Cache { error, .. } | LoadOutcome::Unchanged { error } => Some(error),
        }
    }
}

/// Result of a mutation once its remote call has settled.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The remote store accepted the change. Carries the authoritative record
    /// when the server returned one.
    Committed(Option<Task>),
    /// The remote call failed and the list was reloaded.
    Resynced {
        error: BackendError,
        load: LoadOutcome,
        notice: Option<&'static str>,
    },
    /// The remote call failed and the optimistic change was undone exactly.
    RolledBack { error: BackendError, notice: &'static str },
}

impl SyncOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, SyncOutcome::Committed(_))
    }

    /// Message to show the user, if this outcome warrants one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SyncOutcome::Committed(_) => None,
            SyncOutcome::Resynced { notice, .. } => *notice,
            SyncOutcome::RolledBack { notice, .. } => Some(notice),
        }
    }
}

/// Count of open and finished tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub pending: usize,
    pub done: usize,
}

/// Owns the task list for one session and keeps it in sync with the remote store.
///
/// Cloning is cheap and every clone shares the same state, so a clone can be
/// moved into a spawned task while the UI keeps reading from another.
///
/// # Example
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio::sync::Mutex;
/// use tasksync::backend::factory::create_backend;
/// use tasksync::config::Config;
/// use tasksync::session::Session;
/// use tasksync::storage::{LocalCache, LocalStorage};
/// use tasksync::sync::TaskSyncController;
/// use tasksync::task::Priority;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let session = Session::new("token");
/// let storage = Arc::new(Mutex::new(LocalStorage::in_memory().await?));
/// let backend = create_backend(&config.backend, &session)?;
/// let cache = LocalCache::for_session(storage, &session, config.cache.scope_by_user);
/// let controller = TaskSyncController::new(backend.into(), cache, &config.sync);
///
/// controller.load().await;
/// let outcome = controller.add("Buy milk", Some(Priority::High)).await?;
/// if let Some(notice) = outcome.notice() {
///     println!("{notice}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TaskSyncController {
    backend: Arc<dyn Backend>,
    cache: LocalCache,
    state: Arc<Mutex<TaskState>>,
    locks: Arc<EntityLocks>,
    load_lock: Arc<Mutex<()>>,
    notify_toggle_failures: bool,
}

impl TaskSyncController {
    /// Creates a controller with an empty task list.
    pub fn new(backend: Arc<dyn Backend>, cache: LocalCache, config: &SyncConfig) -> Self {
        Self {
            backend,
            cache,
            state: Arc::new(Mutex::new(TaskState::default())),
            locks: Arc::new(EntityLocks::default()),
            load_lock: Arc::new(Mutex::new(())),
            notify_toggle_failures: config.notify_toggle_failures,
        }
    }

    /// The ordered task list.
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.lock().await.tasks()
    }

    /// The ordered task list with pending markers, for rendering in-flight state.
    pub async fn entries(&self) -> Vec<Entry> {
        self.state.lock().await.entries()
    }

    pub async fn task(&self, id: &str) -> Option<Task> {
        let id = self.locks.resolve(id);
        self.state.lock().await.get(&id).map(|e| e.task.clone())
    }

    pub async fn summary(&self) -> TaskSummary {
        let state = self.state.lock().await;
        state.tasks().iter().fold(TaskSummary::default(), |mut summary, task| {
            if task.done {
                summary.done += 1;
            } else {
                summary.pending += 1;
            }
            summary
        })
    }

    /// Whether a load is running right now.
    pub fn is_loading(&self) -> bool {
        self.load_lock.try_lock().is_err()
    }

    /// Replace the task list with the remote one, falling back to the cache.
    ///
    /// Never fails: when neither source is usable the current list stays as
    /// it is. Concurrent loads run one after another so cache writes cannot
    /// interleave.
    pub async fn load(&self) -> LoadOutcome {
        let _guard = self.load_lock.lock().await;
        info!("🔄 Loading tasks from {} backend...", self.backend.backend_type());

        let error = match self.backend.fetch_tasks().await {
            Ok(mut tasks) => {
                sort_by_priority(&mut tasks);
                let count = tasks.len();
                info!("✅ Fetched {count} tasks");

                self.state.lock().await.replace_all(tasks.clone());

                if let Err(e) = self.cache.write(&tasks).await {
                    error!("❌ Failed to cache tasks: {e:#}");
                }
                return LoadOutcome::Remote { count };
            }
            Err(e) => e,
        };

        warn!("⚠️  Remote fetch failed, trying cache: {error}");
        match self.cache.read().await {
            Some(tasks) => {
                let count = tasks.len();
                self.state.lock().await.replace_all(tasks);
                info!("📦 Restored {count} tasks from cache");
                LoadOutcome::Cache { count, error }
            }
            None => {
                warn!("⚠️  No cached tasks available, keeping current list");
                LoadOutcome::Unchanged { error }
            }
        }
    }
}
