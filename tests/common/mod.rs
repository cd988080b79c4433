#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::Notify;

use tasksync::backend::{Backend, BackendError, CreateTaskArgs};
use tasksync::config::SyncConfig;
use tasksync::storage::{LocalCache, LocalStorage};
use tasksync::sync::TaskSyncController;
use tasksync::task::Task;

/// Scripted in-memory stand-in for the remote store.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    tasks: Vec<Task>,
    next_id: u64,
    offline: bool,
    fail_create_after_commit: bool,
    fail_toggle: bool,
    fail_delete: bool,
    create_gate: Option<Arc<Notify>>,
    toggle_gate: Option<Arc<Notify>>,
    delete_gate: Option<Arc<Notify>>,
    calls: Vec<&'static str>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with `tasks`, newest first.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().tasks = tasks;
        backend
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Store created tasks but report the create as failed.
    pub fn fail_create_after_commit(&self) {
        self.state.lock().unwrap().fail_create_after_commit = true;
    }

    pub fn fail_toggle(&self, fail: bool) {
        self.state.lock().unwrap().fail_toggle = fail;
    }

    pub fn fail_delete(&self, fail: bool) {
        self.state.lock().unwrap().fail_delete = fail;
    }

    /// Hold every create until the returned handle is notified.
    pub fn gate_creates(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().create_gate = Some(gate.clone());
        gate
    }

    /// Hold every toggle until the returned handle is notified.
    pub fn gate_toggles(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().toggle_gate = Some(gate.clone());
        gate
    }

    /// Hold every delete until the returned handle is notified.
    pub fn gate_deletes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().delete_gate = Some(gate.clone());
        gate
    }

    pub fn server_tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(name);
        if state.offline {
            return Err(BackendError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn backend_type(&self) -> &str {
        "mock"
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.record("fetch")?;
        Ok(self.server_tasks())
    }

    async fn create_task(&self, args: CreateTaskArgs) -> Result<Task, BackendError> {
        self.record("create")?;

        let gate = self.state.lock().unwrap().create_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let task = Task {
            id: format!("{:024x}", state.next_id),
            text: args.text,
            done: false,
            priority: args.priority,
            created_at: Some(Utc::now()),
        };
        state.tasks.insert(0, task.clone());

        if state.fail_create_after_commit {
            return Err(BackendError::Network("request timed out after 5s".to_string()));
        }
        Ok(task)
    }

    async fn toggle_task(&self, remote_id: &str) -> Result<Task, BackendError> {
        self.record("toggle")?;

        let gate = self.state.lock().unwrap().toggle_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_toggle {
            return Err(BackendError::Authority("Invalid token".to_string()));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == remote_id)
            .ok_or_else(|| BackendError::Authority("Todo not found".to_string()))?;
        task.done = !task.done;
        Ok(task.clone())
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), BackendError> {
        self.record("delete")?;

        let gate = self.state.lock().unwrap().delete_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(BackendError::Network("HTTP 502 Bad Gateway".to_string()));
        }
        state.tasks.retain(|t| t.id != remote_id);
        Ok(())
    }
}

pub async fn memory_storage() -> Arc<AsyncMutex<LocalStorage>> {
    Arc::new(AsyncMutex::new(LocalStorage::in_memory().await.unwrap()))
}

/// Controller over `backend` with a fresh in-memory cache.
pub async fn controller(backend: Arc<MockBackend>) -> (TaskSyncController, LocalCache) {
    controller_with(backend, &SyncConfig::default()).await
}

pub async fn controller_with(backend: Arc<MockBackend>, config: &SyncConfig) -> (TaskSyncController, LocalCache) {
    let cache = LocalCache::new(memory_storage().await);
    let controller = TaskSyncController::new(backend, cache.clone(), config);
    (controller, cache)
}

pub fn texts(tasks: &[Task]) -> Vec<String> {
    tasks.iter().map(|t| t.text.clone()).collect()
}
