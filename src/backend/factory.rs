//! Backend factory for creating backend instances from configuration.

use anyhow::{anyhow, Result};
use std::time::Duration;

use super::{http::HttpBackend, Backend};
use crate::config::BackendConfig;
use crate::session::Session;

/// Create a backend instance from configuration and the active session.
///
/// # Errors
/// Returns error if the backend type is unknown
pub fn create_backend(config: &BackendConfig, session: &Session) -> Result<Box<dyn Backend>> {
    match config.backend_type.as_str() {
        "http" => Ok(Box::new(HttpBackend::new(
            config.base_url.clone(),
            session,
            Duration::from_secs(config.timeout_secs),
        ))),
        other => Err(anyhow!("Unknown backend type: {}", other)),
    }
}
