//! CLI entry point for the book rating sync tool.
//!
//! Aggregates a ratings CSV into per-book summaries and either logs/exports
//! them or upserts them into a Notion database.

use anyhow::Result;
use book_rating_sync::{
    config::NotionConfig,
    infra::notion::NotionClient,
    ingest::ingest_file,
    output::{print_json, print_pretty, write_summaries},
    stats::{BookSummary, DEFAULT_TOP_RATING, RatingAggregator},
    sync::{FixedInterval, sync_summaries},
    title::capitalize_words,
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "book_rating_sync")]
#[command(
    about = "Aggregate book ratings from a CSV export and sync them to Notion",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate ratings and upsert one Notion page per book
    Sync {
        /// Ratings CSV with `title,rater,rating` rows
        #[arg(short, long, default_value = "ratings.csv")]
        input: String,

        /// Rating value that counts as a favorite
        #[arg(short, long, default_value_t = DEFAULT_TOP_RATING)]
        favorite_rating: f64,

        /// Minimum delay between writes, in milliseconds
        #[arg(short, long, default_value_t = 300)]
        delay_ms: u64,

        /// Log the planned summaries without contacting Notion
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Aggregate ratings and log or export the summaries
    Summarize {
        /// Ratings CSV with `title,rater,rating` rows
        #[arg(short, long, default_value = "ratings.csv")]
        input: String,

        /// Rating value that counts as a favorite
        #[arg(short, long, default_value_t = DEFAULT_TOP_RATING)]
        favorite_rating: f64,

        /// Optional CSV file to write the summaries to
        #[arg(short, long)]
        output: Option<String>,

        /// Log the summaries as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/book_rating_sync.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("book_rating_sync.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            input,
            favorite_rating,
            delay_ms,
            dry_run,
        } => {
            let summaries = summarize(&input, favorite_rating)?;

            if dry_run {
                for summary in &summaries {
                    info!(
                        title = %capitalize_words(&summary.title),
                        average_rating = summary.average_rating,
                        favorite_count = summary.favorite_count,
                        "Would sync"
                    );
                }
                return Ok(());
            }

            let config = NotionConfig::from_env()?;
            let store = NotionClient::from_config(&config)?;
            let mut throttle = FixedInterval::new(Duration::from_millis(delay_ms));

            let report = sync_summaries(&store, &summaries, &mut throttle).await?;
            if report.failed > 0 {
                anyhow::bail!("{} of {} books failed to sync", report.failed, summaries.len());
            }
        }
        Commands::Summarize {
            input,
            favorite_rating,
            output,
            json,
        } => {
            let summaries = summarize(&input, favorite_rating)?;

            print_pretty(&summaries);
            if json {
                print_json(&summaries)?;
            }
            if let Some(path) = output {
                write_summaries(&path, &summaries)?;
                info!(path = %path, rows = summaries.len(), "Summaries written");
            }
        }
    }

    Ok(())
}

/// Builds an [`EnvFilter`] from `var`, falling back to `default` when unset.
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

/// Reads the whole CSV and returns the finalized summaries.
fn summarize(input: &str, favorite_rating: f64) -> Result<Vec<BookSummary>> {
    let mut aggregator = RatingAggregator::with_top_rating(favorite_rating);
    ingest_file(input, &mut aggregator)?;

    let summaries = aggregator.finalize();
    info!(books = summaries.len(), "Ratings aggregated");
    Ok(summaries)
}
