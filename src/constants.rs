//! Constants used throughout the application
//!
//! This module centralizes storage keys, user-facing notices, and default
//! configuration values.

// Storage keys
pub const TASKS_CACHE_KEY: &str = "todos_cache";
pub const SESSION_KEY: &str = "auth";

// Notices surfaced to the user after a failed remote call
pub const NOTICE_CREATE_FAILED: &str = "❗ Failed syncing to cloud";
pub const NOTICE_DELETE_FAILED: &str = "⚠️ Delete failed, restored";
pub const NOTICE_TOGGLE_FAILED: &str = "⚠️ Update failed, list refreshed";

// Validation Error Messages
pub const ERROR_EMPTY_TASK_TEXT: &str = "Task text required";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const ERROR_NO_SESSION: &str = "❌ Error: no session token found";

// Configuration defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOKEN_ENV: &str = "TASKSYNC_TOKEN";
/// Default request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 120;
pub const LOG_FILE_NAME: &str = "tasksync.log";
pub const APP_DIR_NAME: &str = "tasksync";
pub const CONFIG_PATH_ENV: &str = "TASKSYNC_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "tasksync.toml";
