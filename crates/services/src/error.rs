//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::{ExerciseError, ExerciseRef};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while loading an exercise catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by practice session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("exercise not available: {0}")]
    Unavailable(ExerciseRef),
    #[error("exercise has not been completed yet")]
    NotCompleted,
    #[error(transparent)]
    Session(#[from] practice_core::model::SessionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
