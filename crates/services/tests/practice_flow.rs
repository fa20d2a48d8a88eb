use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use practice_core::model::{
    Difficulty, EditKind, ExerciseIndex, ExerciseRef, Language, LedgerRecord, ProgressLedger,
    SessionState,
};
use practice_core::time::fixed_now;
use services::{
    Clock, Exercise, InMemoryCatalog, PracticeLoopService, ProgressService, SessionError,
};
use storage::repository::{InMemoryRepository, ProgressRepository, StorageError, StoredRecord};

fn ex(language: Language, difficulty: Difficulty, index: usize) -> ExerciseRef {
    ExerciseRef::new(language, difficulty, ExerciseIndex::new(index).unwrap())
}

fn content(title: &str, expected_output: &str) -> Exercise {
    Exercise {
        title: title.to_string(),
        description: format!("{title} description"),
        expected_output: expected_output.to_string(),
        test_cases: Vec::new(),
    }
}

fn full_catalog() -> Arc<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::new();
    for language in Language::ALL {
        for difficulty in Difficulty::ALL {
            for index in ExerciseIndex::all() {
                catalog.insert(
                    ExerciseRef::new(language, difficulty, index),
                    content(&format!("Exercise {}", index.value() + 1), ""),
                );
            }
        }
    }
    catalog.insert(
        ex(Language::Java, Difficulty::Easy, 0),
        content("Hello", "Hello, World!"),
    );
    Arc::new(catalog)
}

async fn loop_with(repo: Arc<dyn ProgressRepository>) -> PracticeLoopService {
    let clock = Clock::fixed(fixed_now());
    let progress = ProgressService::load(repo).await;
    PracticeLoopService::new(clock, full_catalog(), progress)
}

/// Repository whose writes fail until `heal` is called.
#[derive(Clone, Default)]
struct FlakyRepository {
    inner: InMemoryRepository,
    healthy: Arc<std::sync::atomic::AtomicBool>,
}

impl FlakyRepository {
    fn heal(&self) {
        self.healthy.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressRepository for FlakyRepository {
    async fn load_record(&self) -> Result<Option<StoredRecord>, StorageError> {
        self.inner.load_record().await
    }

    async fn save_record(
        &self,
        record: &LedgerRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if !self.healthy.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StorageError::Connection("disk unavailable".into()));
        }
        self.inner.save_record(record, saved_at).await
    }
}

#[tokio::test]
async fn successful_submission_scores_and_persists() {
    let repo = InMemoryRepository::new();
    let mut practice = loop_with(Arc::new(repo.clone())).await;
    let exercise = ex(Language::Java, Difficulty::Easy, 0);

    let mut session = practice.start_session(exercise).unwrap();
    assert_eq!(session.content().title, "Hello");

    practice.edit(&mut session, EditKind::Insertion);
    practice.edit(&mut session, EditKind::Deletion);
    practice.clock_mut().advance(Duration::seconds(100));
    practice.tick(&mut session);
    assert_eq!(session.elapsed_display(), "1:40");

    let outcome = practice.submit(&mut session, "int x = 1;").await.unwrap();
    assert!(outcome.succeeded);
    assert!(outcome.diagnostics.is_empty());
    assert_eq!(outcome.score.map(|s| s.value()), Some(94));
    assert_eq!(outcome.output.as_deref(), Some("Hello, World!"));
    assert!(outcome.newly_completed);
    assert!(!outcome.language_complete);
    assert!(session.completion_recorded());

    let stored = repo.load_record().await.unwrap().unwrap();
    assert_eq!(stored.updated_at, fixed_now() + Duration::seconds(100));
    assert!(ProgressLedger::from_record(&stored.record).is_completed(exercise));
}

#[tokio::test]
async fn failed_submission_reports_diagnostics_and_keeps_timing() {
    let repo = InMemoryRepository::new();
    let practice = loop_with(Arc::new(repo.clone())).await;

    let mut session = practice
        .start_session(ex(Language::MySql, Difficulty::Medium, 2))
        .unwrap();
    practice.edit(&mut session, EditKind::Insertion);

    let outcome = practice.submit(&mut session, "printt(5)").await.unwrap();
    assert!(!outcome.succeeded);
    assert_eq!(outcome.score, None);
    assert_eq!(outcome.output, None);
    assert!(!outcome.newly_completed);
    assert_eq!(outcome.diagnostics[0].line, 1);
    assert_eq!(outcome.diagnostics[0].message, "Function name misspelled");
    assert_eq!(session.state(), SessionState::Timing);
    assert!(repo.raw().unwrap().is_none());
}

#[tokio::test]
async fn success_without_expected_output_uses_default_message() {
    let practice = loop_with(Arc::new(InMemoryRepository::new())).await;
    let mut session = practice
        .start_session(ex(Language::Python, Difficulty::Easy, 4))
        .unwrap();
    practice.edit(&mut session, EditKind::Insertion);

    let outcome = practice.submit(&mut session, "print(1)").await.unwrap();
    assert_eq!(
        outcome.output.as_deref(),
        Some("Program executed successfully!")
    );
}

#[tokio::test]
async fn completing_again_in_a_new_session_writes_nothing() {
    let repo = InMemoryRepository::new();
    let mut practice = loop_with(Arc::new(repo.clone())).await;
    let exercise = ex(Language::C, Difficulty::Hard, 5);

    let mut first = practice.start_session(exercise).unwrap();
    practice.edit(&mut first, EditKind::Insertion);
    assert!(practice.submit(&mut first, "int a = 1;").await.unwrap().newly_completed);
    let written = repo.raw().unwrap();

    practice.clock_mut().advance(Duration::seconds(60));
    let mut second = practice.start_session(exercise).unwrap();
    practice.edit(&mut second, EditKind::Insertion);
    let outcome = practice.submit(&mut second, "int a = 2;").await.unwrap();
    assert!(outcome.succeeded);
    assert!(!outcome.newly_completed);

    let stored = repo.load_record().await.unwrap().unwrap();
    assert_eq!(repo.raw().unwrap(), written);
    assert_eq!(stored.updated_at, fixed_now());
}

#[tokio::test]
async fn last_exercise_of_a_language_reports_language_complete() {
    let repo = InMemoryRepository::new();
    let mut seeded = ProgressLedger::new();
    for difficulty in Difficulty::ALL {
        for index in ExerciseIndex::all() {
            let exercise = ExerciseRef::new(Language::Html, difficulty, index);
            if exercise != ex(Language::Html, Difficulty::Extreme, 19) {
                seeded.record_completion(exercise);
            }
        }
    }
    repo.save_record(&seeded.to_record(), fixed_now()).await.unwrap();

    let practice = loop_with(Arc::new(repo.clone())).await;
    assert_eq!(practice.progress().ledger().percentage(Language::Html), 99);

    let mut session = practice
        .start_session(ex(Language::Html, Difficulty::Extreme, 19))
        .unwrap();
    practice.edit(&mut session, EditKind::Insertion);
    let outcome = practice.submit(&mut session, "<p>done</p>").await.unwrap();

    assert!(outcome.newly_completed);
    assert!(outcome.language_complete);
    let overview = practice.progress().language_progress(Language::Html);
    assert_eq!(overview.percentage, 100);
    assert!(overview.certificate_eligible);
}

#[tokio::test]
async fn navigation_resets_the_session_and_clamps_at_the_ends() {
    let mut practice = loop_with(Arc::new(InMemoryRepository::new())).await;
    let mut session = practice
        .start_session(ex(Language::C, Difficulty::Easy, 3))
        .unwrap();

    practice.edit(&mut session, EditKind::Insertion);
    for _ in 0..7 {
        practice.edit(&mut session, EditKind::Deletion);
    }
    practice.clock_mut().advance(Duration::seconds(12));
    practice.tick(&mut session);
    assert_eq!(session.telemetry().correction_count, 7);

    assert!(practice.next_exercise(&mut session).unwrap());
    assert_eq!(session.exercise().index.value(), 4);
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.telemetry().elapsed_seconds, 0);
    assert_eq!(session.telemetry().correction_count, 0);
    assert!(session.diagnostics().is_empty());

    practice
        .navigate(&mut session, ex(Language::C, Difficulty::Easy, 19))
        .unwrap();
    assert!(!practice.next_exercise(&mut session).unwrap());
    assert_eq!(session.exercise().index.value(), 19);

    practice
        .navigate(&mut session, ex(Language::C, Difficulty::Easy, 0))
        .unwrap();
    assert!(!practice.previous_exercise(&mut session).unwrap());
    assert_eq!(session.exercise().index.value(), 0);
}

#[tokio::test]
async fn unavailable_exercise_is_rejected_without_touching_the_session() {
    let clock = Clock::fixed(fixed_now());
    let mut catalog = InMemoryCatalog::new();
    let only = ex(Language::Php, Difficulty::Easy, 0);
    catalog.insert(only, content("Only", ""));
    let progress = ProgressService::load(Arc::new(InMemoryRepository::new())).await;
    let practice = PracticeLoopService::new(clock, Arc::new(catalog), progress);

    let missing = ex(Language::Php, Difficulty::Easy, 1);
    assert!(matches!(
        practice.start_session(missing),
        Err(SessionError::Unavailable(e)) if e == missing
    ));

    let mut session = practice.start_session(only).unwrap();
    practice.edit(&mut session, EditKind::Deletion);
    assert!(practice.next_exercise(&mut session).is_err());
    assert_eq!(session.exercise(), only);
    assert_eq!(session.telemetry().correction_count, 1);
}

#[tokio::test]
async fn submit_rejects_idle_blank_and_completed_sessions() {
    let practice = loop_with(Arc::new(InMemoryRepository::new())).await;
    let mut session = practice
        .start_session(ex(Language::Css, Difficulty::Easy, 0))
        .unwrap();

    let err = practice.submit(&mut session, "a { b: c; }").await.unwrap_err();
    assert!(matches!(err, SessionError::Session(_)));

    practice.edit(&mut session, EditKind::Insertion);
    let err = practice.submit(&mut session, "   ").await.unwrap_err();
    assert!(matches!(err, SessionError::Session(_)));

    assert!(practice.submit(&mut session, "a { b: c; }").await.unwrap().succeeded);
    let err = practice.submit(&mut session, "a { b: c; }").await.unwrap_err();
    assert!(matches!(err, SessionError::Session(_)));
}

#[tokio::test]
async fn failed_write_leaves_ledger_unchanged_until_finalized() {
    let repo = FlakyRepository::default();
    let practice = loop_with(Arc::new(repo.clone())).await;
    let exercise = ex(Language::JavaScript, Difficulty::Medium, 7);

    let mut session = practice.start_session(exercise).unwrap();
    practice.edit(&mut session, EditKind::Insertion);

    let err = practice
        .submit(&mut session, "let x = 1;\nconsole.log(x);")
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Progress(_)));
    assert!(session.is_succeeded());
    assert!(!session.completion_recorded());
    assert!(!practice.progress().is_completed(exercise));

    repo.heal();
    assert!(practice.finalize_completion(&mut session).await.unwrap());
    assert!(practice.progress().is_completed(exercise));
    assert!(!practice.finalize_completion(&mut session).await.unwrap());

    let stored = repo.load_record().await.unwrap().unwrap();
    assert!(ProgressLedger::from_record(&stored.record).is_completed(exercise));
}

#[tokio::test]
async fn finalize_requires_a_succeeded_session() {
    let practice = loop_with(Arc::new(InMemoryRepository::new())).await;
    let mut session = practice
        .start_session(ex(Language::Ml, Difficulty::Easy, 0))
        .unwrap();
    let err = practice.finalize_completion(&mut session).await.unwrap_err();
    assert!(matches!(err, SessionError::NotCompleted));
}
