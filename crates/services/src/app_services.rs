use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::{ExerciseCatalog, InMemoryCatalog};
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::sessions::PracticeLoopService;

/// Assembles the practice services over one storage backend and catalog.
///
/// The progress ledger is loaded once; every handle given out shares it.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    catalog: Arc<dyn ExerciseCatalog>,
    progress: ProgressService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Without a catalog path the catalog is empty; analysis still works but
    /// no session can be started.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog_path: Option<&Path>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let catalog = match catalog_path {
            Some(path) => InMemoryCatalog::from_path(path)?,
            None => {
                tracing::warn!("no exercise catalog configured");
                InMemoryCatalog::new()
            }
        };
        Ok(Self::with_parts(clock, &storage, Arc::new(catalog)).await)
    }

    /// Build services over an existing storage backend, loading the ledger from it.
    pub async fn with_parts(
        clock: Clock,
        storage: &Storage,
        catalog: Arc<dyn ExerciseCatalog>,
    ) -> Self {
        let progress = ProgressService::load(Arc::clone(&storage.progress)).await;
        Self {
            clock,
            catalog,
            progress,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<dyn ExerciseCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Handle to the shared progress ledger.
    #[must_use]
    pub fn progress(&self) -> ProgressService {
        self.progress.clone()
    }

    /// A practice loop over the shared ledger, with its own copy of the clock.
    #[must_use]
    pub fn practice_loop(&self) -> PracticeLoopService {
        PracticeLoopService::new(self.clock, self.catalog(), self.progress())
    }
}
