use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use practice_core::model::{Difficulty, ExerciseRef, Language, ProgressLedger, ROSTER_SIZE};
use storage::repository::ProgressRepository;
use tokio::sync::Mutex;

use crate::error::ProgressError;

/// Completion figures for one difficulty of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProgress {
    pub difficulty: Difficulty,
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

/// Aggregated view of one language's progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageProgress {
    pub language: Language,
    pub completed: usize,
    pub percentage: u8,
    pub difficulties: Vec<DifficultyProgress>,
    pub certificate_eligible: bool,
}

struct SharedLedger {
    ledger: RwLock<ProgressLedger>,
    // Held across the save so concurrent writers never persist a stale copy.
    write_gate: Mutex<()>,
}

/// Handle to the process-wide progress ledger.
///
/// Clones share one ledger; a completion recorded through any handle is
/// visible through all of them and is never overwritten by another.
#[derive(Clone)]
pub struct ProgressService {
    repo: Arc<dyn ProgressRepository>,
    shared: Arc<SharedLedger>,
}

impl ProgressService {
    /// Load the ledger from storage.
    ///
    /// Never fails: a missing, unreadable or corrupt record yields an empty ledger.
    pub async fn load(repo: Arc<dyn ProgressRepository>) -> Self {
        let ledger = match repo.load_record().await {
            Ok(Some(stored)) => {
                let ledger = ProgressLedger::from_record(&stored.record);
                tracing::debug!(updated_at = %stored.updated_at, "loaded progress ledger");
                ledger
            }
            Ok(None) => ProgressLedger::new(),
            Err(err) => {
                tracing::warn!(error = %err, "progress record unusable; starting empty");
                ProgressLedger::new()
            }
        };
        Self {
            repo,
            shared: Arc::new(SharedLedger {
                ledger: RwLock::new(ledger),
                write_gate: Mutex::new(()),
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&ProgressLedger) -> T) -> T {
        let guard = self
            .shared
            .ledger
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Snapshot of the current ledger.
    #[must_use]
    pub fn ledger(&self) -> ProgressLedger {
        self.read(ProgressLedger::clone)
    }

    #[must_use]
    pub fn is_completed(&self, exercise: ExerciseRef) -> bool {
        self.read(|ledger| ledger.is_completed(exercise))
    }

    #[must_use]
    pub fn is_language_complete(&self, language: Language) -> bool {
        self.read(|ledger| ledger.is_language_complete(language))
    }

    /// Mark `exercise` completed and persist the ledger with `saved_at`.
    ///
    /// Returns `false` without touching storage if it was already completed.
    /// The shared ledger changes only after the write succeeds.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be saved.
    pub async fn record_completion(
        &self,
        exercise: ExerciseRef,
        saved_at: DateTime<Utc>,
    ) -> Result<bool, ProgressError> {
        let _gate = self.shared.write_gate.lock().await;

        let mut updated = self.ledger();
        if !updated.record_completion(exercise) {
            return Ok(false);
        }
        self.repo.save_record(&updated.to_record(), saved_at).await?;

        let language_complete = updated.is_language_complete(exercise.language);
        *self
            .shared
            .ledger
            .write()
            .unwrap_or_else(PoisonError::into_inner) = updated;

        tracing::info!(%exercise, "exercise completed");
        if language_complete {
            tracing::info!(language = %exercise.language, "language complete");
        }
        Ok(true)
    }

    #[must_use]
    pub fn language_progress(&self, language: Language) -> LanguageProgress {
        self.read(|ledger| summarize(ledger, language))
    }

    /// Progress for every language, in catalog order.
    #[must_use]
    pub fn overview(&self) -> Vec<LanguageProgress> {
        self.read(|ledger| {
            Language::ALL
                .iter()
                .map(|&language| summarize(ledger, language))
                .collect()
        })
    }
}

fn summarize(ledger: &ProgressLedger, language: Language) -> LanguageProgress {
    let difficulties = Difficulty::ALL
        .iter()
        .map(|&difficulty| DifficultyProgress {
            difficulty,
            completed: ledger.completed_in(language, difficulty),
            total: ROSTER_SIZE,
            percentage: ledger.percentage_for_difficulty(language, difficulty),
        })
        .collect();

    LanguageProgress {
        language,
        completed: ledger.completed_count(language),
        percentage: ledger.percentage(language),
        difficulties,
        certificate_eligible: ledger.is_language_complete(language),
    }
}
