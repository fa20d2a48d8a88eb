#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod progress_service;
pub mod sessions;

pub use practice_core::Clock;

pub use app_services::AppServices;
pub use catalog::{Exercise, ExerciseCatalog, InMemoryCatalog, TestCase};
pub use error::{AppServicesError, CatalogError, ProgressError, SessionError};
pub use progress_service::{DifficultyProgress, LanguageProgress, ProgressService};
pub use sessions::{PracticeLoopService, PracticeSession, SubmissionOutcome};
