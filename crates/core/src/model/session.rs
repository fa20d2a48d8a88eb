use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyzer;
use crate::model::{Diagnostic, ExerciseRef};
use crate::scoring::{self, CompletionScore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("nothing has been typed yet")]
    NotStarted,

    #[error("submission is empty")]
    BlankSubmission,

    #[error("exercise already completed in this session")]
    Completed,
}

//
// ─── TELEMETRY ─────────────────────────────────────────────────────────────────
//

/// Behavioural measurements gathered during one attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub elapsed_seconds: u32,
    pub correction_count: u32,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing typed yet; telemetry is zero.
    Idle,
    /// The learner is editing and the clock is running.
    Timing,
    /// The analyzer is running on a submission.
    Evaluating,
    /// The submission passed; telemetry is frozen.
    Succeeded,
}

/// Kind of keystroke reported by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insertion,
    Deletion,
}

impl EditKind {
    #[must_use]
    pub fn from_deletion(is_deletion: bool) -> Self {
        if is_deletion {
            EditKind::Deletion
        } else {
            EditKind::Insertion
        }
    }
}

/// Verdict of a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub diagnostics: Vec<Diagnostic>,
    pub succeeded: bool,
    /// Present only when `succeeded` is true.
    pub score: Option<CompletionScore>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Lifecycle of one attempt at one exercise.
///
/// `idle -> timing -> evaluating -> (timing | succeeded)`. Navigation resets it.
/// Timestamps are passed in by the caller so the machine stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    exercise: ExerciseRef,
    state: SessionState,
    telemetry: Telemetry,
    diagnostics: Vec<Diagnostic>,
    started_at: Option<DateTime<Utc>>,
    score: Option<CompletionScore>,
}

impl Session {
    #[must_use]
    pub fn new(exercise: ExerciseRef) -> Self {
        Self {
            exercise,
            state: SessionState::Idle,
            telemetry: Telemetry::default(),
            diagnostics: Vec::new(),
            started_at: None,
            score: None,
        }
    }

    #[must_use]
    pub fn exercise(&self) -> ExerciseRef {
        self.exercise
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn telemetry(&self) -> Telemetry {
        self.telemetry
    }

    /// Diagnostics from the most recent submission.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn score(&self) -> Option<CompletionScore> {
        self.score
    }

    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.state == SessionState::Succeeded
    }

    /// Record one keystroke.
    ///
    /// The first edit starts the clock; deletions always count as corrections.
    pub fn on_edit(&mut self, kind: EditKind, now: DateTime<Utc>) {
        if kind == EditKind::Deletion {
            self.telemetry.correction_count = self.telemetry.correction_count.saturating_add(1);
        }
        if self.state == SessionState::Idle {
            self.state = SessionState::Timing;
            self.started_at = Some(now);
        }
    }

    /// Periodic clock sample. Ignored outside of `Timing`.
    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        if self.state != SessionState::Timing {
            return;
        }
        let Some(started_at) = self.started_at else {
            return;
        };
        let elapsed = (now - started_at).num_seconds().max(0);
        self.telemetry.elapsed_seconds = u32::try_from(elapsed).unwrap_or(u32::MAX);
    }

    /// Evaluate `source` and move to `Timing` or `Succeeded`.
    ///
    /// A submission with diagnostics is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` while idle, `SessionError::BlankSubmission`
    /// for whitespace-only source, and `SessionError::Completed` once succeeded.
    pub fn submit(&mut self, source: &str, now: DateTime<Utc>) -> Result<Submission, SessionError> {
        match self.state {
            SessionState::Idle => return Err(SessionError::NotStarted),
            SessionState::Succeeded => return Err(SessionError::Completed),
            SessionState::Timing | SessionState::Evaluating => {}
        }
        if source.trim().is_empty() {
            return Err(SessionError::BlankSubmission);
        }

        self.on_tick(now);
        self.state = SessionState::Evaluating;
        self.diagnostics = analyzer::analyze(source, self.exercise.language);

        if self.diagnostics.is_empty() {
            let score = scoring::score(self.telemetry);
            self.score = Some(score);
            self.state = SessionState::Succeeded;
        } else {
            self.state = SessionState::Timing;
        }

        Ok(Submission {
            diagnostics: self.diagnostics.clone(),
            succeeded: self.is_succeeded(),
            score: self.score,
        })
    }

    /// Switch to another exercise, discarding everything about this attempt.
    pub fn reset(&mut self, exercise: ExerciseRef) {
        *self = Self::new(exercise);
    }
}

/// Formats seconds as `m:ss`.
#[must_use]
pub fn format_elapsed(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
