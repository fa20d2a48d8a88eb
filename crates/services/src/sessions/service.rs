use practice_core::model::{
    Diagnostic, ExerciseRef, Session, SessionState, Telemetry, format_elapsed,
};
use practice_core::scoring::CompletionScore;

use crate::catalog::Exercise;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's attempt at the exercise currently on screen.
///
/// Wraps the core state machine together with the catalog content it is
/// running against. Mutation goes through `PracticeLoopService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSession {
    session: Session,
    content: Exercise,
    completion_recorded: bool,
}

impl PracticeSession {
    pub(crate) fn new(exercise: ExerciseRef, content: Exercise) -> Self {
        Self {
            session: Session::new(exercise),
            content,
            completion_recorded: false,
        }
    }

    #[must_use]
    pub fn exercise(&self) -> ExerciseRef {
        self.session.exercise()
    }

    #[must_use]
    pub fn content(&self) -> &Exercise {
        &self.content
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    #[must_use]
    pub fn telemetry(&self) -> Telemetry {
        self.session.telemetry()
    }

    /// Elapsed time formatted as `m:ss`.
    #[must_use]
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.session.telemetry().elapsed_seconds)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.session.diagnostics()
    }

    #[must_use]
    pub fn score(&self) -> Option<CompletionScore> {
        self.session.score()
    }

    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.session.is_succeeded()
    }

    /// Whether the completion of this attempt reached the ledger.
    #[must_use]
    pub fn completion_recorded(&self) -> bool {
        self.completion_recorded
    }

    /// Text shown in the output pane after a successful run.
    #[must_use]
    pub fn success_output(&self) -> String {
        if self.content.expected_output.is_empty() {
            "Program executed successfully!".to_string()
        } else {
            self.content.expected_output.clone()
        }
    }

    pub(crate) fn core_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) fn mark_recorded(&mut self) {
        self.completion_recorded = true;
    }

    pub(crate) fn replace(&mut self, exercise: ExerciseRef, content: Exercise) {
        self.session.reset(exercise);
        self.content = content;
        self.completion_recorded = false;
    }
}
