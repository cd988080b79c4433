use anyhow::{Context, Result};
use log::info;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;

use crate::entities::CacheEntry;

/// Local storage manager backed by SQLite through SeaORM.
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage directory: {}", parent.display()))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        info!("💾 Opening local storage at {}", path.display());
        Self::connect(url, 4).await
    }

    /// Open a private in-memory database. Nothing survives the process.
    pub async fn in_memory() -> Result<Self> {
        // Every pooled connection would get its own in-memory database
        Self::connect("sqlite::memory:".to_string(), 1).await
    }

    async fn connect(url: String, max_connections: u32) -> Result<Self> {
        let mut options = ConnectOptions::new(url);
        options
            .min_connections(1)
            .max_connections(max_connections)
            .sqlx_logging(false);

        let conn = Database::connect(options).await.context("Failed to connect to local storage")?;
        let storage = LocalStorage { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut create_entries = schema.create_table_from_entity(CacheEntry);
        create_entries.if_not_exists();
        self.conn
            .execute(backend.build(&create_entries))
            .await
            .context("Failed to create cache_entries table")?;

        Ok(())
    }
}
