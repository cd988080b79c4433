//! Cache entry repository for database operations.

use anyhow::Result;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::cache_entry;

/// Repository for key-value cache entries.
pub struct CacheEntryRepository;

impl CacheEntryRepository {
    /// Get the entry stored under `key`.
    pub async fn get<C>(conn: &C, key: &str) -> Result<Option<cache_entry::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(cache_entry::Entity::find_by_id(key.to_string()).one(conn).await?)
    }

    /// Insert or replace the value stored under `key` in a single statement.
    pub async fn upsert<C>(conn: &C, key: &str, value: String) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let entry = cache_entry::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            updated_at: ActiveValue::Set(Utc::now().to_rfc3339()),
        };

        cache_entry::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(cache_entry::Column::Key)
                    .update_columns([cache_entry::Column::Value, cache_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(conn)
            .await?;

        Ok(())
    }

    /// Delete the entry stored under `key`, if any.
    pub async fn delete<C>(conn: &C, key: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        cache_entry::Entity::delete_many()
            .filter(cache_entry::Column::Key.eq(key))
            .exec(conn)
            .await?;
        Ok(())
    }

    /// List every stored key.
    pub async fn keys<C>(conn: &C) -> Result<Vec<String>>
    where
        C: ConnectionTrait,
    {
        Ok(cache_entry::Entity::find()
            .all(conn)
            .await?
            .into_iter()
            .map(|entry| entry.key)
            .collect())
    }
}
