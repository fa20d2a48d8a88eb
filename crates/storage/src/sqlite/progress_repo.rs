use async_trait::async_trait;
use chrono::{DateTime, Utc};
use practice_core::model::LedgerRecord;
use sqlx::Row;

use crate::repository::{PROGRESS_KEY, ProgressRepository, StorageError, StoredRecord};

use super::SqliteRepository;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_record(&self) -> Result<Option<StoredRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT value, updated_at
            FROM kv_store
            WHERE key = ?1
            ",
        )
        .bind(PROGRESS_KEY)
        .fetch_optional(self.pool())
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row.try_get("value").map_err(ser)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;
        let record = LedgerRecord::from_json(&value).map_err(ser)?;

        Ok(Some(StoredRecord { record, updated_at }))
    }

    async fn save_record(
        &self,
        record: &LedgerRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(PROGRESS_KEY)
        .bind(record.to_json())
        .bind(saved_at)
        .execute(self.pool())
        .await
        .map_err(conn)?;

        tracing::debug!(key = PROGRESS_KEY, "saved progress record");
        Ok(())
    }
}
