mod service;
mod workflow;

// Public API of the practice session subsystem.
pub use crate::error::SessionError;
pub use service::PracticeSession;
pub use workflow::{PracticeLoopService, SubmissionOutcome};
