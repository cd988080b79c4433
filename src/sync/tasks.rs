use log::{error, info};

use super::{PendingOp, SyncError, SyncOutcome, TaskSyncController};
use crate::backend::CreateTaskArgs;
use crate::constants::{ERROR_EMPTY_TASK_TEXT, NOTICE_CREATE_FAILED, NOTICE_DELETE_FAILED, NOTICE_TOGGLE_FAILED};
use crate::task::{new_temp_id, Priority, Task};

impl TaskSyncController {
    /// Adds a task optimistically and confirms it with the remote store.
    ///
    /// The task appears under a temp id before the remote call is issued. On
    /// success the temp entry is swapped for the server's record in one step;
    /// on failure the list is reloaded, which keeps the tentative entry only
    /// when neither the remote store nor the cache can be read.
    ///
    /// # Arguments
    /// * `text` - Task text; surrounding whitespace is trimmed
    /// * `priority` - Defaults to [`Priority::Medium`]
    ///
    /// # Errors
    /// Returns [`SyncError::Validation`] for blank text, before any remote call
    pub async fn add(&self, text: &str, priority: Option<Priority>) -> Result<SyncOutcome, SyncError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SyncError::Validation(ERROR_EMPTY_TASK_TEXT.to_string()));
        }
        let priority = priority.unwrap_or_default();

        // Held until the create settles so operations on the temp id queue behind it
        let temp_id = new_temp_id();
        let _guard = self.locks.acquire(&temp_id).await;

        self.state
            .lock()
            .await
            .insert_tentative(Task::tentative(temp_id.clone(), text.to_string(), priority));

        let args = CreateTaskArgs {
            text: text.to_string(),
            priority,
        };
        match self.backend.create_task(args).await {
            Ok(record) => {
                info!("✅ Created task {} (was {temp_id})", record.id);
                self.locks.alias(&temp_id, &record.id);
                self.state.lock().await.promote(&temp_id, record.clone());
                Ok(SyncOutcome::Committed(Some(record)))
            }
            Err(e) => {
                error!("❌ Failed to create task: {e}");
                // The reload decides: a remote or cached list replaces the
                // tentative entry, otherwise it stays
                self.state.lock().await.set_pending(&temp_id, None);
                let load = self.load().await;
                Ok(SyncOutcome::Resynced {
                    error: e,
                    load,
                    notice: Some(NOTICE_CREATE_FAILED),
                })
            }
        }
    }

    /// Flips a task's `done` flag optimistically and confirms it remotely.
    ///
    /// A failed confirmation reloads the list rather than flipping back, so the
    /// result always reflects the remote store (or the cache when offline).
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] if `id` names no task, including a temp
    /// id whose create failed
    pub async fn toggle_done(&self, id: &str) -> Result<SyncOutcome, SyncError> {
        let _guard = self.locks.acquire(id).await;
        let id = self.locks.resolve(id);

        {
            let mut state = self.state.lock().await;
            if state.flip_done(&id).is_none() {
                return Err(SyncError::NotFound(id));
            }
            state.set_pending(&id, Some(PendingOp::Toggle));
        }

        match self.backend.toggle_task(&id).await {
            Ok(record) => {
                info!("✅ Toggled task {id}");
                self.state.lock().await.settle_toggle(&record);
                Ok(SyncOutcome::Committed(Some(record)))
            }
            Err(e) => {
                error!("❌ Failed to toggle task {id}: {e}");
                // Cleared first so the reload overwrites the optimistic flip
                self.state.lock().await.set_pending(&id, None);
                let load = self.load().await;
                Ok(SyncOutcome::Resynced {
                    error: e,
                    load,
                    notice: self.notify_toggle_failures.then_some(NOTICE_TOGGLE_FAILED),
                })
            }
        }
    }

    /// Removes a task optimistically and confirms the deletion remotely.
    ///
    /// A failed confirmation puts the task back exactly where it was.
    ///
    /// # Errors
    /// Returns [`SyncError::NotFound`] if `id` names no task
    pub async fn delete(&self, id: &str) -> Result<SyncOutcome, SyncError> {
        let _guard = self.locks.acquire(id).await;
        let id = self.locks.resolve(id);

        let (index, entry) = self
            .state
            .lock()
            .await
            .begin_delete(&id)
            .ok_or_else(|| SyncError::NotFound(id.clone()))?;

        match self.backend.delete_task(&id).await {
            Ok(()) => {
                info!("✅ Deleted task {id}");
                self.state.lock().await.finish_delete(&id);
                self.locks.forget(&id);
                Ok(SyncOutcome::Committed(None))
            }
            Err(e) => {
                error!("❌ Failed to delete task {id}, restoring: {e}");
                self.state.lock().await.restore(index, entry);
                Ok(SyncOutcome::RolledBack {
                    error: e,
                    notice: NOTICE_DELETE_FAILED,
                })
            }
        }
    }
}
