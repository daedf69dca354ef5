//! Per-book rating aggregation.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::parser::{RatingRecord, RowParseError, parse_line};

/// Rating value that counts as a favorite unless configured otherwise.
pub const DEFAULT_TOP_RATING: f64 = 5.0;

/// Aggregated statistics for a single book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub title: String,
    pub average_rating: f64,
    pub favorite_count: usize,
    pub rating_count: usize,
}

/// Collects the latest rating per `(title, rater)` pair.
///
/// Feed records in input order, then call [`finalize`](Self::finalize) once
/// to get one [`BookSummary`] per title. A later record for the same pair
/// replaces the earlier one.
#[derive(Debug)]
pub struct RatingAggregator {
    top_rating: f64,
    latest: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for RatingAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingAggregator {
    pub fn new() -> Self {
        Self::with_top_rating(DEFAULT_TOP_RATING)
    }

    /// Uses `top_rating` as the favorite threshold.
    pub fn with_top_rating(top_rating: f64) -> Self {
        Self {
            top_rating,
            latest: BTreeMap::new(),
        }
    }

    pub fn feed(&mut self, record: RatingRecord) {
        self.latest
            .entry(record.title)
            .or_default()
            .insert(record.rater, record.rating);
    }

    /// Parses `line` and feeds it. Nothing is recorded on error.
    pub fn feed_line(&mut self, line: &str) -> Result<(), RowParseError> {
        self.feed(parse_line(line)?);
        Ok(())
    }

    /// Number of distinct titles seen so far.
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }

    /// Consumes the table and returns summaries sorted by title.
    pub fn finalize(self) -> Vec<BookSummary> {
        let top_rating = self.top_rating;

        self.latest
            .into_iter()
            .map(|(title, ratings)| {
                let values: Vec<f64> = ratings.into_values().collect();
                let favorite_count = values.iter().filter(|&&r| r == top_rating).count();

                BookSummary {
                    title,
                    average_rating: mean(&values),
                    favorite_count,
                    rating_count: values.len(),
                }
            })
            .collect()
    }
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
