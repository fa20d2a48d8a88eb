use std::sync::Arc;

use chrono::Duration;
use practice_core::model::{
    Difficulty, EditKind, ExerciseIndex, ExerciseRef, Language, ProgressLedger,
};
use practice_core::time::fixed_now;
use services::{AppServices, Clock, Exercise, InMemoryCatalog, ProgressService};
use storage::repository::{ProgressRepository, Storage};

fn ex(language: Language, difficulty: Difficulty, index: usize) -> ExerciseRef {
    ExerciseRef::new(language, difficulty, ExerciseIndex::new(index).unwrap())
}

fn c_easy_catalog() -> Arc<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::new();
    for index in ExerciseIndex::all() {
        catalog.insert(
            ExerciseRef::new(Language::C, Difficulty::Easy, index),
            Exercise {
                title: format!("C {}", index.value() + 1),
                description: "Write a statement".to_string(),
                expected_output: String::new(),
                test_cases: Vec::new(),
            },
        );
    }
    Arc::new(catalog)
}

async fn persisted(storage: &Storage) -> ProgressLedger {
    let stored = storage.progress.load_record().await.unwrap().unwrap();
    ProgressLedger::from_record(&stored.record)
}

#[tokio::test]
async fn completions_from_every_handle_reach_one_ledger() {
    let storage = Storage::in_memory();
    let app = AppServices::with_parts(Clock::fixed(fixed_now()), &storage, c_easy_catalog()).await;

    let display = app.progress();
    let loop_a = app.practice_loop();
    let loop_b = loop_a.clone();
    let first = ex(Language::C, Difficulty::Easy, 0);
    let second = ex(Language::C, Difficulty::Easy, 1);

    let mut session = loop_a.start_session(first).unwrap();
    loop_a.edit(&mut session, EditKind::Insertion);
    assert!(loop_a.submit(&mut session, "int a = 1;").await.unwrap().newly_completed);

    let mut session = loop_b.start_session(second).unwrap();
    loop_b.edit(&mut session, EditKind::Insertion);
    assert!(loop_b.submit(&mut session, "int b = 2;").await.unwrap().newly_completed);

    assert!(display.is_completed(first));
    assert!(display.is_completed(second));
    assert!(app.progress().is_completed(first));

    let stored = persisted(&storage).await;
    assert!(stored.is_completed(first));
    assert!(stored.is_completed(second));
    assert_eq!(stored, display.ledger());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_are_all_persisted() {
    let storage = Storage::in_memory();
    let progress = ProgressService::load(Arc::clone(&storage.progress)).await;
    let other = progress.clone();

    let writes = (0..10).map(|index| {
        let handle = if index % 2 == 0 { progress.clone() } else { other.clone() };
        async move {
            handle
                .record_completion(ex(Language::Python, Difficulty::Medium, index), fixed_now())
                .await
        }
    });
    let results: Vec<_> = spawn_all(writes).await;
    assert!(results.into_iter().all(|r| r.unwrap()));

    let stored = persisted(&storage).await;
    assert_eq!(stored.completed_in(Language::Python, Difficulty::Medium), 10);
    assert_eq!(progress.ledger().completed_in(Language::Python, Difficulty::Medium), 10);
}

async fn spawn_all<F, T>(futures: impl Iterator<Item = F>) -> Vec<T>
where
    F: std::future::Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = futures.map(tokio::spawn).collect();
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test]
async fn saved_timestamp_follows_the_loop_clock() {
    let storage = Storage::in_memory();
    let app = AppServices::with_parts(Clock::fixed(fixed_now()), &storage, c_easy_catalog()).await;
    let mut practice = app.practice_loop();

    let mut session = practice
        .start_session(ex(Language::C, Difficulty::Easy, 7))
        .unwrap();
    practice.edit(&mut session, EditKind::Insertion);
    practice.clock_mut().advance(Duration::minutes(3));
    practice.submit(&mut session, "int x = 7;").await.unwrap();

    let stored = storage.progress.load_record().await.unwrap().unwrap();
    assert_eq!(stored.updated_at, fixed_now() + Duration::minutes(3));
}
