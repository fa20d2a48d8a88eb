use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Duration, Utc};
use practice_core::analyzer;
use practice_core::model::{Difficulty, EditKind, ExerciseIndex, ExerciseRef, Language};
use services::{
    AppServices, Clock, ExerciseCatalog, InMemoryCatalog, LanguageProgress, SessionError,
};

use crate::db::prepare_sqlite_file;

/// Where the persisted state and catalog live.
pub struct Settings {
    pub db_url: String,
    pub catalog: Option<PathBuf>,
}

impl Settings {
    async fn services(&self, clock: Clock) -> anyhow::Result<AppServices> {
        // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
        prepare_sqlite_file(&self.db_url)?;
        let services = AppServices::new_sqlite(&self.db_url, clock, self.catalog.as_deref())
            .await
            .with_context(|| format!("opening {}", self.db_url))?;
        Ok(services)
    }
}

fn read_source(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("reading stdin")?;
            Ok(source)
        }
    }
}

fn exercise_ref(language: Language, difficulty: Difficulty, number: u8) -> anyhow::Result<ExerciseRef> {
    let index = ExerciseIndex::new(usize::from(number).saturating_sub(1))?;
    Ok(ExerciseRef::new(language, difficulty, index))
}

fn not_available(exercise: ExerciseRef) -> ExitCode {
    println!("{exercise}: not available");
    ExitCode::from(1)
}

pub fn check(language: Language, file: Option<&Path>) -> anyhow::Result<ExitCode> {
    let source = read_source(file)?;
    let diagnostics = analyzer::analyze(&source, language);
    if diagnostics.is_empty() {
        println!("No issues found.");
        return Ok(ExitCode::SUCCESS);
    }
    for diagnostic in &diagnostics {
        println!("{diagnostic}");
    }
    Ok(ExitCode::from(1))
}

pub struct SubmitArgs {
    pub language: Language,
    pub difficulty: Difficulty,
    pub number: u8,
    pub file: Option<PathBuf>,
    pub elapsed: u32,
    pub corrections: u32,
}

/// Replays one attempt through the practice loop and persists a completion.
pub async fn submit(settings: &Settings, args: SubmitArgs) -> anyhow::Result<ExitCode> {
    let exercise = exercise_ref(args.language, args.difficulty, args.number)?;
    let source = read_source(args.file.as_deref())?;

    let services = settings.services(Clock::fixed(Utc::now())).await?;
    let mut practice = services.practice_loop();
    let mut session = match practice.start_session(exercise) {
        Ok(session) => session,
        Err(SessionError::Unavailable(_)) => return Ok(not_available(exercise)),
        Err(err) => return Err(err.into()),
    };

    println!("{exercise}: {}", session.content().title);

    practice.edit(&mut session, EditKind::Insertion);
    for _ in 0..args.corrections {
        practice.edit(&mut session, EditKind::Deletion);
    }
    practice
        .clock_mut()
        .advance(Duration::seconds(i64::from(args.elapsed)));
    practice.tick(&mut session);

    let outcome = practice.submit(&mut session, &source).await?;
    println!("Time: {}", session.elapsed_display());
    println!("Corrections: {}", session.telemetry().correction_count);

    if !outcome.succeeded {
        for diagnostic in &outcome.diagnostics {
            println!("{diagnostic}");
        }
        return Ok(ExitCode::from(1));
    }

    if let Some(output) = &outcome.output {
        println!("{output}");
    }
    if let Some(score) = outcome.score {
        println!("Completion score: {score}");
    }
    if outcome.newly_completed {
        tracing::info!(%exercise, "progress saved");
    }
    if outcome.language_complete {
        println!("All {} exercises complete. Certificate unlocked!", args.language);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_language(progress: &LanguageProgress) {
    let certificate = if progress.certificate_eligible {
        "certificate available"
    } else {
        "in progress"
    };
    let total: usize = progress.difficulties.iter().map(|level| level.total).sum();
    println!(
        "{:<15} {:>3}%  ({}/{total})  {certificate}",
        progress.language.name(),
        progress.percentage,
        progress.completed
    );
    for level in &progress.difficulties {
        println!(
            "    {:<8} {:>3}%  ({}/{})",
            level.difficulty.name(),
            level.percentage,
            level.completed,
            level.total
        );
    }
}

pub async fn progress(settings: &Settings, language: Option<Language>) -> anyhow::Result<ExitCode> {
    let services = settings.services(Clock::system()).await?;
    let progress = services.progress();

    match language {
        Some(language) => print_language(&progress.language_progress(language)),
        None => progress.overview().iter().for_each(print_language),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn show(
    settings: &Settings,
    language: Language,
    difficulty: Difficulty,
    number: u8,
) -> anyhow::Result<ExitCode> {
    let exercise = exercise_ref(language, difficulty, number)?;
    let catalog = match &settings.catalog {
        Some(path) => InMemoryCatalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => InMemoryCatalog::new(),
    };

    let Some(content) = catalog.lookup(exercise) else {
        return Ok(not_available(exercise));
    };

    println!("{exercise}: {}", content.title);
    println!();
    println!("{}", content.description);
    if !content.expected_output.is_empty() {
        println!();
        println!("Expected output:");
        println!("{}", content.expected_output);
    }
    for (n, case) in content.test_cases.iter().enumerate() {
        println!();
        println!("Test case {}:", n + 1);
        println!("  input:  {}", case.input);
        println!("  output: {}", case.output);
    }
    Ok(ExitCode::SUCCESS)
}
