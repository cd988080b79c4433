//! Session context threaded through the backend and the cache.
//!
//! Token issuance happens elsewhere; this module only carries the credential
//! and persists it between runs.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::constants::SESSION_KEY;
use crate::repositories::CacheEntryRepository;
use crate::storage::LocalStorage;

/// The signed-in user as reported at login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
}

/// Credential plus user identity for the active session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

impl Session {
    /// Session from a bare token, user unknown.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }

    pub fn with_user(token: impl Into<String>, user: UserInfo) -> Self {
        Self {
            token: token.into(),
            user: Some(user),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// Persists the session in local storage.
pub struct SessionStore {
    storage: Arc<Mutex<LocalStorage>>,
}

impl SessionStore {
    pub fn new(storage: Arc<Mutex<LocalStorage>>) -> Self {
        Self { storage }
    }

    /// Restore the saved session. A corrupt entry reads as no session.
    pub async fn load(&self) -> Result<Option<Session>> {
        let storage = self.storage.lock().await;
        let Some(entry) = CacheEntryRepository::get(&storage.conn, SESSION_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&entry.value) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("⚠️  Ignoring corrupt stored session: {e}");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let payload = serde_json::to_string(session).context("Failed to serialize session")?;
        let storage = self.storage.lock().await;
        CacheEntryRepository::upsert(&storage.conn, SESSION_KEY, payload).await?;
        info!("🔑 Session saved");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        let storage = self.storage.lock().await;
        CacheEntryRepository::delete(&storage.conn, SESSION_KEY).await?;
        info!("🔑 Session cleared");
        Ok(())
    }
}
