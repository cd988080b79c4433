//! TOML configuration: remote store, cache location, sync and logging options.

use crate::constants::{
    APP_DIR_NAME, CONFIG_GENERATED, CONFIG_PATH_ENV, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_ENV,
    LOCAL_CONFIG_FILE, MAX_TIMEOUT_SECS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration; every section falls back to its defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Remote store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend type (currently only "http")
    pub backend_type: String,
    /// Base URL of the to-do server
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Environment variable holding the session token
    pub token_env: String,
}

/// Local cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Database file; defaults to `<data_dir>/tasksync/cache.db`
    pub database_path: Option<PathBuf>,
    /// Keep a separate snapshot per signed-in user instead of one per install
    pub scope_by_user: bool,
}

/// Sync behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Surface a notice when a toggle fails (deletes and adds always do)
    pub notify_toggle_failures: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to a file in the data directory
    pub enabled: bool,
    /// Minimum level: "error", "warn", "info", "debug" or "trace"
    pub level: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_type: "http".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Parsed log level filter
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid logging level '{}'", self.level))
    }
}

impl CacheConfig {
    /// Resolve the database path, falling back to the platform data directory
    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::get_data_dir()?.join("cache.db")),
        }
    }
}

impl Config {
    /// Resolve and load the active configuration.
    ///
    /// Lookup order: `$TASKSYNC_CONFIG`, `./tasksync.toml`, then
    /// `<config_dir>/tasksync/config.toml`. No file means defaults.
    pub fn load() -> Result<Self> {
        match Self::find_config_file()? {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate the TOML file at `path`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
        let config: Self = toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    fn find_config_file() -> Result<Option<PathBuf>> {
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
            let explicit = PathBuf::from(explicit);
            if !explicit.is_file() {
                anyhow::bail!("{} points to a missing file: {}", CONFIG_PATH_ENV, explicit.display());
            }
            return Ok(Some(explicit));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(Self::get_default_config_path().ok().filter(|path| path.is_file()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.backend.backend_type.as_str() {
            "http" => {}
            other => anyhow::bail!("unsupported backend_type '{}'", other),
        }

        let url = self.backend.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) || url.len() <= "https://".len() {
            anyhow::bail!("base_url must be an http(s) URL, got '{}'", self.backend.base_url);
        }

        if self.backend.timeout_secs == 0 || self.backend.timeout_secs > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "timeout_secs must be between 1 and {}, got {}",
                MAX_TIMEOUT_SECS,
                self.backend.timeout_secs
            );
        }

        if self.backend.token_env.is_empty() {
            anyhow::bail!("token_env cannot be empty");
        }

        self.logging.level_filter()?;

        Ok(())
    }

    /// Write a commented default configuration to `path`, creating parent
    /// directories as needed.
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let body = toml::to_string_pretty(&Self::default()).context("Cannot serialize default configuration")?;
        let contents = format!(
            "# tasksync Configuration File\n# Written {}; every key is optional.\n\n{body}",
            chrono::Local::now().format("%Y-%m-%d")
        );

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        std::fs::write(path, contents).with_context(|| format!("Cannot write {}", path.display()))?;

        println!("{CONFIG_GENERATED}: {}", path.display());
        Ok(())
    }

    /// `<config_dir>/tasksync`
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .context("No platform config directory")
    }

    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }

    /// `<data_dir>/tasksync`, home of the cache database and the log file
    pub fn get_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .context("No platform data directory")
    }
}
