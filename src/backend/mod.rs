//! Remote authority abstraction.
//!
//! This module defines the interface the sync controller uses to reach the
//! remote task store, along with the argument types and error handling shared
//! by every implementation.

use async_trait::async_trait;
use serde::Serialize;

use crate::task::{Priority, Task};

pub mod factory;
pub mod http;

/// Errors reported by a backend.
///
/// The controller handles every variant the same way (resync or rollback); the
/// distinction only changes the message shown to the user.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// The request never produced a usable response: unreachable host,
    /// timeout, or a non-2xx status.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a structured error payload.
    #[error("Server rejected request: {0}")]
    Authority(String),

    /// The server answered but the body could not be decoded.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl BackendError {
    /// Whether the failure happened below the application protocol.
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Network(_))
    }
}

/// Arguments for creating a new task.
#[derive(Clone, Debug, Serialize)]
pub struct CreateTaskArgs {
    pub text: String,
    pub priority: Priority,
}

/// Backend trait that every remote task store implementation must provide.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Returns the backend type identifier (e.g., "http").
    fn backend_type(&self) -> &str;

    /// Fetch every task owned by the session user, newest first.
    async fn fetch_tasks(&self) -> Result<Vec<Task>, BackendError>;

    /// Create a task and return the stored record with its real id.
    async fn create_task(&self, args: CreateTaskArgs) -> Result<Task, BackendError>;

    /// Flip the `done` flag server-side and return the updated record.
    async fn toggle_task(&self, remote_id: &str) -> Result<Task, BackendError>;

    async fn delete_task(&self, remote_id: &str) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_failures_are_transport() {
        assert!(BackendError::Network("connection refused".to_string()).is_transport());
        assert!(!BackendError::Authority("Invalid token".to_string()).is_transport());
        assert!(!BackendError::InvalidData("missing field `text`".to_string()).is_transport());
    }
}
