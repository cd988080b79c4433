use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{Config, LoggingConfig};
use crate::constants::LOG_FILE_NAME;

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Lines kept by the in-memory buffer; older lines are dropped first.
pub const LOG_BUFFER_CAPACITY: usize = 500;

/// Bounded in-memory record of this run's log lines, shared by clones.
#[derive(Clone)]
pub struct Logger {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_capacity(LOG_BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(LOG_BUFFER_CAPACITY)))),
            capacity: capacity.max(1),
        }
    }

    /// Append `message` stamped with the wall-clock time
    pub fn log(&self, message: String) {
        let line = format!("[{}] {message}", Utc::now().format("%H:%M:%S%.3f"));
        if let Ok(mut lines) = self.lines.lock() {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    /// Buffered lines, newest first
    pub fn get_logs(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    pub fn get_log_file_path() -> Result<PathBuf> {
        Ok(Config::get_data_dir()?.join(LOG_FILE_NAME))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the global `log` dispatcher.
///
/// Every record is copied into the returned in-memory [`Logger`]; when
/// `config.enabled` is set, records also go to the log file. Only the first
/// call installs anything; later calls return the same logger.
pub fn init(config: &LoggingConfig) -> Result<Logger> {
    GLOBAL_LOGGER
        .get_or_try_init(|| {
            let logger = Logger::new();
            let level = config.level_filter()?;

            let memory = logger.clone();
            let mut dispatch = fern::Dispatch::new()
                .level(level)
                .level_for("sqlx", log::LevelFilter::Warn)
                .level_for("sea_orm", log::LevelFilter::Warn)
                .chain(fern::Output::call(move |record| {
                    memory.log(format!("{} {}", record.level(), record.args()));
                }));

            if config.enabled {
                let path = Logger::get_log_file_path()?;
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
                }
                let file = fern::log_file(&path)
                    .with_context(|| format!("Failed to open log file: {}", path.display()))?;
                dispatch = dispatch.chain(
                    fern::Dispatch::new()
                        .format(|out, message, record| {
                            out.finish(format_args!(
                                "{} [{}] {}: {}",
                                Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                                record.level(),
                                record.target(),
                                message
                            ))
                        })
                        .chain(file),
                );
            }

            dispatch.apply().context("Failed to install logger")?;
            Ok(logger)
        })
        .cloned()
}
