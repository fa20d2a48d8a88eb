use async_trait::async_trait;
use chrono::{DateTime, Utc};
use practice_core::model::LedgerRecord;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Key under which the progress ledger is stored.
pub const PROGRESS_KEY: &str = "codingPlatformProgress";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored ledger record and when it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub record: LedgerRecord,
    pub updated_at: DateTime<Utc>,
}

/// Repository contract for the progress ledger.
///
/// The ledger is one self-contained record; saves replace it wholesale.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored record.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored text is not valid JSON,
    /// or other storage errors.
    async fn load_record(&self) -> Result<Option<StoredRecord>, StorageError>;

    /// Persist the record, replacing any previous one. Completes only once durable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_record(
        &self,
        record: &LedgerRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Holds the record as JSON text, the same shape the `SQLite` backend stores.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<Option<(String, DateTime<Utc>)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the raw stored text, bypassing validation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_raw(&self, text: impl Into<String>, at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some((text.into(), at));
        Ok(())
    }

    /// Raw stored text, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.as_ref().map(|(text, _)| text.clone()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_record(&self) -> Result<Option<StoredRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let Some((text, updated_at)) = guard.as_ref() else {
            return Ok(None);
        };
        let record = LedgerRecord::from_json(text)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(StoredRecord {
            record,
            updated_at: *updated_at,
        }))
    }

    async fn save_record(
        &self,
        record: &LedgerRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.put_raw(record.to_json(), saved_at)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
