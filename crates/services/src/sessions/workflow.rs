use std::sync::Arc;

use practice_core::model::{Diagnostic, EditKind, ExerciseIndex, ExerciseRef};
use practice_core::scoring::CompletionScore;

use super::service::PracticeSession;
use crate::Clock;
use crate::catalog::{Exercise, ExerciseCatalog};
use crate::error::SessionError;
use crate::progress_service::ProgressService;

/// Result of submitting source for the current exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub succeeded: bool,
    pub score: Option<CompletionScore>,
    /// Output pane text; present only on success.
    pub output: Option<String>,
    /// True when this submission added the exercise to the ledger.
    pub newly_completed: bool,
    /// True when the exercise's language is now fully completed.
    pub language_complete: bool,
}

/// Orchestrates practice sessions, navigation and persisted completion.
///
/// Clones share the progress ledger but each keeps its own clock.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    catalog: Arc<dyn ExerciseCatalog>,
    progress: ProgressService,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<dyn ExerciseCatalog>, progress: ProgressService) -> Self {
        Self {
            clock,
            catalog,
            progress,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access to the clock, for stepping a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<dyn ExerciseCatalog> {
        Arc::clone(&self.catalog)
    }

    fn content(&self, exercise: ExerciseRef) -> Result<Exercise, SessionError> {
        self.catalog
            .lookup(exercise)
            .ok_or(SessionError::Unavailable(exercise))
    }

    /// Start an idle session on the given exercise.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unavailable` if the catalog has no such exercise.
    pub fn start_session(&self, exercise: ExerciseRef) -> Result<PracticeSession, SessionError> {
        let content = self.content(exercise)?;
        tracing::debug!(%exercise, "session started");
        Ok(PracticeSession::new(exercise, content))
    }

    /// Move the session to another exercise, discarding the current attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Unavailable` and leaves the session untouched
    /// if the catalog has no such exercise.
    pub fn navigate(
        &self,
        session: &mut PracticeSession,
        exercise: ExerciseRef,
    ) -> Result<(), SessionError> {
        let content = self.content(exercise)?;
        session.replace(exercise, content);
        tracing::debug!(%exercise, "navigated");
        Ok(())
    }

    /// Step forward within the roster.
    ///
    /// Returns `Ok(false)` at the last exercise without changing anything.
    ///
    /// # Errors
    ///
    /// As [`PracticeLoopService::navigate`].
    pub fn next_exercise(&self, session: &mut PracticeSession) -> Result<bool, SessionError> {
        self.step(session, ExerciseIndex::next)
    }

    /// Step back within the roster.
    ///
    /// Returns `Ok(false)` at the first exercise without changing anything.
    ///
    /// # Errors
    ///
    /// As [`PracticeLoopService::navigate`].
    pub fn previous_exercise(&self, session: &mut PracticeSession) -> Result<bool, SessionError> {
        self.step(session, ExerciseIndex::previous)
    }

    fn step(
        &self,
        session: &mut PracticeSession,
        move_index: fn(ExerciseIndex) -> Option<ExerciseIndex>,
    ) -> Result<bool, SessionError> {
        let current = session.exercise();
        let Some(index) = move_index(current.index) else {
            return Ok(false);
        };
        self.navigate(session, current.with_index(index))?;
        Ok(true)
    }

    /// Forward one editor keystroke to the session.
    pub fn edit(&self, session: &mut PracticeSession, kind: EditKind) {
        session.core_mut().on_edit(kind, self.clock.now());
    }

    /// Sample the clock for the elapsed-time display.
    pub fn tick(&self, session: &mut PracticeSession) {
        session.core_mut().on_tick(self.clock.now());
    }

    /// Analyze `source` and, on success, persist the completion.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Session` when the session cannot accept a
    /// submission and `SessionError::Progress` when the ledger write fails.
    /// After a failed write the session stays succeeded; call
    /// [`PracticeLoopService::finalize_completion`] to retry.
    pub async fn submit(
        &self,
        session: &mut PracticeSession,
        source: &str,
    ) -> Result<SubmissionOutcome, SessionError> {
        let exercise = session.exercise();
        let now = self.clock.now();
        let submission = session.core_mut().submit(source, now)?;

        if !submission.succeeded {
            tracing::debug!(
                %exercise,
                diagnostics = submission.diagnostics.len(),
                "submission rejected"
            );
            return Ok(SubmissionOutcome {
                diagnostics: submission.diagnostics,
                succeeded: false,
                score: None,
                output: None,
                newly_completed: false,
                language_complete: self.progress.is_language_complete(exercise.language),
            });
        }

        let newly_completed = self.progress.record_completion(exercise, now).await?;
        session.mark_recorded();

        Ok(SubmissionOutcome {
            diagnostics: submission.diagnostics,
            succeeded: true,
            score: submission.score,
            output: Some(session.success_output()),
            newly_completed,
            language_complete: self.progress.is_language_complete(exercise.language),
        })
    }

    /// Retry the ledger write for a succeeded session.
    ///
    /// This is useful when the write during `submit` failed (e.g. transient storage error).
    /// Returns whether this call added the exercise to the ledger.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` if the session has not succeeded.
    /// Returns `SessionError::Progress` if persistence fails.
    pub async fn finalize_completion(
        &self,
        session: &mut PracticeSession,
    ) -> Result<bool, SessionError> {
        if session.completion_recorded() {
            return Ok(false);
        }
        if !session.is_succeeded() {
            return Err(SessionError::NotCompleted);
        }

        let added = self
            .progress
            .record_completion(session.exercise(), self.clock.now())
            .await?;
        session.mark_recorded();
        Ok(added)
    }
}
