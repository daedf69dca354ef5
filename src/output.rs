//! Output formatting and persistence for book summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use tracing::{debug, info};

use crate::stats::{BookSummary, round_to};
use crate::title::capitalize_words;

/// One row of the CSV export.
#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    generated_at: DateTime<Utc>,
    title: &'a str,
    display_title: String,
    average_rating: f64,
    favorite_count: usize,
    rating_count: usize,
}

/// Logs each summary using Rust's debug pretty-print format.
pub fn print_pretty(summaries: &[BookSummary]) {
    for summary in summaries {
        debug!("{:#?}", summary);
    }
}

/// Logs the summaries as pretty-printed JSON.
pub fn print_json(summaries: &[BookSummary]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summaries)?);
    Ok(())
}

/// Writes the summaries to a CSV file at `path`, replacing any existing file.
///
/// Averages are rounded to two decimals, the same as the values sent to the
/// record store.
pub fn write_summaries(path: &str, summaries: &[BookSummary]) -> Result<()> {
    debug!(path, rows = summaries.len(), "Writing summary CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    let generated_at = Utc::now();
    for summary in summaries {
        writer.serialize(SummaryRow {
            generated_at,
            title: &summary.title,
            display_title: capitalize_words(&summary.title),
            average_rating: round_to(summary.average_rating, 2),
            favorite_count: summary.favorite_count,
            rating_count: summary.rating_count,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::Path;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample() -> Vec<BookSummary> {
        vec![
            BookSummary {
                title: "moby dick".to_string(),
                average_rating: 3.5,
                favorite_count: 0,
                rating_count: 2,
            },
            BookSummary {
                title: "the great gatsby".to_string(),
                average_rating: 13.0 / 3.0,
                favorite_count: 2,
                rating_count: 3,
            },
        ]
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&sample()).unwrap();
    }

    #[test]
    fn test_write_summaries_creates_file() {
        let path = temp_path("book_rating_sync_test_create.csv");
        let _ = fs::remove_file(&path);

        write_summaries(&path, &sample()).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("generated_at,title,display_title"));
        assert!(lines[2].contains("the great gatsby,The Great Gatsby,4.33,2,3"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_summaries_replaces_existing_file() {
        let path = temp_path("book_rating_sync_test_replace.csv");
        let _ = fs::remove_file(&path);

        write_summaries(&path, &sample()).unwrap();
        write_summaries(&path, &sample()[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("generated_at")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }
}
