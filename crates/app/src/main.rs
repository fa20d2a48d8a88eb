use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use practice_core::model::{Difficulty, Language};
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

use commands::{Settings, SubmitArgs};

#[derive(Parser)]
#[command(name = "practice", version, about = "Coding practice evaluator and progress tracker")]
struct Cli {
    /// SQLite database holding progress
    #[arg(
        long = "db",
        env = "PRACTICE_DB_URL",
        default_value = "sqlite://practice.sqlite3",
        global = true
    )]
    db_url: String,

    /// JSON exercise catalog
    #[arg(long, env = "PRACTICE_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze source code and print diagnostics
    Check {
        /// Language the source is written in
        #[arg(long)]
        language: Language,

        /// Source file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Submit a solution to an exercise and record completion
    Submit {
        #[arg(long)]
        language: Language,

        /// easy, medium, hard or extreme
        #[arg(long)]
        difficulty: Difficulty,

        /// Exercise number within the roster
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=20))]
        index: u8,

        /// Source file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,

        /// Seconds spent on the attempt
        #[arg(long, default_value = "0")]
        elapsed: u32,

        /// Number of corrections (deletions) made
        #[arg(long, default_value = "0")]
        corrections: u32,
    },

    /// Show completion percentages
    Progress {
        /// Limit output to one language
        #[arg(long)]
        language: Option<Language>,
    },

    /// Print an exercise from the catalog
    Show {
        #[arg(long)]
        language: Language,

        #[arg(long)]
        difficulty: Difficulty,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=20))]
        index: u8,
    },
}

/// Used when `RUST_LOG` is unset.
const DEFAULT_DIRECTIVES: [&str; 3] = ["practice=info", "services=info", "storage=warn"];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES.join(",")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings {
        db_url: db::normalize_sqlite_url(&cli.db_url),
        catalog: cli.catalog,
    };

    let result = match cli.command {
        Commands::Check { language, file } => commands::check(language, file.as_deref()),
        Commands::Submit {
            language,
            difficulty,
            index,
            file,
            elapsed,
            corrections,
        } => {
            commands::submit(
                &settings,
                SubmitArgs {
                    language,
                    difficulty,
                    number: index,
                    file,
                    elapsed,
                    corrections,
                },
            )
            .await
        }
        Commands::Progress { language } => commands::progress(&settings, language).await,
        Commands::Show {
            language,
            difficulty,
            index,
        } => commands::show(&settings, language, difficulty, index),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            // At this layer (binary glue), printing once is fine.
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}
