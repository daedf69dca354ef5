//! Feeds a line-oriented ratings source into a [`RatingAggregator`].

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

use crate::stats::RatingAggregator;

/// Row counters from one ingest pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub malformed: usize,
}

/// Reads every line from `reader` in order and feeds it to `aggregator`.
///
/// Malformed rows, blank lines included, are logged and skipped.
///
/// # Errors
///
/// Returns an error if a line cannot be read (including invalid UTF-8).
pub fn ingest_lines<R: BufRead>(
    reader: R,
    aggregator: &mut RatingAggregator,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;

        match aggregator.feed_line(&line) {
            Ok(()) => report.accepted += 1,
            Err(e) => {
                warn!(line_no, row = %e.line(), reason = %e, "FLAG row parsing error");
                report.malformed += 1;
            }
        }
    }

    Ok(report)
}

/// Opens the CSV at `path` and ingests it.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn ingest_file(
    path: impl AsRef<Path>,
    aggregator: &mut RatingAggregator,
) -> Result<IngestReport> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let report = ingest_lines(BufReader::new(file), aggregator)
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    info!(
        accepted = report.accepted,
        malformed = report.malformed,
        titles = aggregator.len(),
        "CSV file successfully processed"
    );

    Ok(report)
}
