mod diagnostic;
mod exercise;
mod progress;
mod session;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use exercise::{
    Difficulty, ExerciseError, ExerciseIndex, ExerciseRef, Language, LanguageClass, ROSTER_SIZE,
};
pub use progress::{LedgerRecord, ProgressLedger, RosterProgress};
pub use session::{
    EditKind, Session, SessionError, SessionState, Submission, Telemetry, format_elapsed,
};
