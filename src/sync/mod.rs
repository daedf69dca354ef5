//! Upserts finalized book summaries into a [`RecordStore`].

mod throttle;

pub use throttle::{FixedInterval, Throttle, Unthrottled};

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, info};

use crate::services::record_store::RecordStore;
use crate::stats::BookSummary;
use crate::title::capitalize_words;

/// Minimum spacing between writes, matching Notion's ~3 requests/second limit.
pub const DEFAULT_WRITE_INTERVAL: Duration = Duration::from_millis(300);

/// Outcome counters for one sync batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Creates or updates one record per summary, in order.
///
/// Existing records are listed once up front and matched by normalized
/// title. Writes go out one at a time, each preceded by `throttle.pace()`.
/// A failed write is logged and counted, and the batch moves on.
///
/// # Errors
///
/// Fails only if the existing records cannot be listed.
#[tracing::instrument(skip_all, fields(summaries = summaries.len()))]
pub async fn sync_summaries<S, T>(
    store: &S,
    summaries: &[BookSummary],
    throttle: &mut T,
) -> Result<SyncReport>
where
    S: RecordStore + Sync + ?Sized,
    T: Throttle + ?Sized,
{
    let existing = store
        .list_existing()
        .await
        .context("Failed to fetch existing records")?;
    info!(existing = existing.len(), "Fetched existing records");

    let mut report = SyncReport::default();

    for summary in summaries {
        let display_title = capitalize_words(&summary.title);
        throttle.pace().await;

        match existing.lookup_existing_by_title(&summary.title) {
            Some(record_id) => {
                match store
                    .update_record(record_id, summary.average_rating, summary.favorite_count)
                    .await
                {
                    Ok(()) => {
                        report.updated += 1;
                        info!(title = %summary.title, record_id, "Updated");
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!(
                            title = %summary.title,
                            record_id,
                            error = %format!("{e:#}"),
                            "Update failed"
                        );
                    }
                }
            }
            None => {
                match store
                    .create_record(&display_title, summary.average_rating, summary.favorite_count)
                    .await
                {
                    Ok(record_id) => {
                        report.created += 1;
                        info!(title = %summary.title, %record_id, "Created");
                    }
                    Err(e) => {
                        report.failed += 1;
                        error!(title = %summary.title, error = %format!("{e:#}"), "Create failed");
                    }
                }
            }
        }
    }

    info!(
        created = report.created,
        updated = report.updated,
        failed = report.failed,
        "Operation complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::record_store::{ExistingRecord, ExistingRecords};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(String, f64, usize),
        Update(String, f64, usize),
    }

    #[derive(Default)]
    struct MemoryStore {
        existing: Vec<ExistingRecord>,
        fail_titles: Vec<String>,
        fail_listing: bool,
        calls: Mutex<Vec<Call>>,
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn list_existing(&self) -> Result<ExistingRecords> {
            if self.fail_listing {
                anyhow::bail!("unauthorized");
            }
            Ok(self.existing.iter().cloned().collect())
        }

        async fn create_record(
            &self,
            display_title: &str,
            average_rating: f64,
            favorite_count: usize,
        ) -> Result<String> {
            if self.fail_titles.iter().any(|t| t == display_title) {
                anyhow::bail!("rate limited");
            }
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Create(display_title.to_string(), average_rating, favorite_count));
            Ok(format!("new-{}", calls.len()))
        }

        async fn update_record(
            &self,
            record_id: &str,
            average_rating: f64,
            favorite_count: usize,
        ) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(record_id.to_string(), average_rating, favorite_count));
            Ok(())
        }
    }

    /// Counts pace calls without sleeping.
    #[derive(Default)]
    struct CountingThrottle(usize);

    #[async_trait]
    impl Throttle for CountingThrottle {
        async fn pace(&mut self) {
            self.0 += 1;
        }
    }

    fn summary(title: &str, average_rating: f64, favorite_count: usize) -> BookSummary {
        BookSummary {
            title: title.to_string(),
            average_rating,
            favorite_count,
            rating_count: 1,
        }
    }

    #[tokio::test]
    async fn test_creates_missing_and_updates_existing() {
        let store = MemoryStore {
            existing: vec![ExistingRecord {
                id: "p1".to_string(),
                title: "Moby Dick".to_string(),
            }],
            ..Default::default()
        };
        let summaries = vec![summary("moby dick", 3.5, 0), summary("the great gatsby", 4.0, 2)];
        let mut throttle = CountingThrottle::default();

        let report = sync_summaries(&store, &summaries, &mut throttle).await.unwrap();

        assert_eq!(report, SyncReport { created: 1, updated: 1, failed: 0 });
        assert_eq!(throttle.0, 2);
        assert_eq!(
            *store.calls.lock().unwrap(),
            vec![
                Call::Update("p1".to_string(), 3.5, 0),
                Call::Create("The Great Gatsby".to_string(), 4.0, 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_write_does_not_abort_batch() {
        let store = MemoryStore {
            fail_titles: vec!["Dune".to_string()],
            ..Default::default()
        };
        let summaries = vec![summary("dune", 5.0, 1), summary("emma", 4.0, 0)];

        let report = sync_summaries(&store, &summaries, &mut Unthrottled).await.unwrap();

        assert_eq!(report, SyncReport { created: 1, updated: 0, failed: 1 });
        assert_eq!(
            *store.calls.lock().unwrap(),
            vec![Call::Create("Emma".to_string(), 4.0, 0)]
        );
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let store = MemoryStore {
            fail_listing: true,
            ..Default::default()
        };

        let err = sync_summaries(&store, &[summary("dune", 5.0, 1)], &mut Unthrottled)
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("unauthorized"));
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_writes() {
        let store = MemoryStore::default();
        let mut throttle = CountingThrottle::default();

        let report = sync_summaries(&store, &[], &mut throttle).await.unwrap();

        assert_eq!(report, SyncReport::default());
        assert_eq!(throttle.0, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_are_spaced_by_interval() {
        let store = MemoryStore::default();
        let summaries = vec![summary("a", 1.0, 0), summary("b", 2.0, 0), summary("c", 3.0, 0)];
        let mut throttle = FixedInterval::new(DEFAULT_WRITE_INTERVAL);

        let start = tokio::time::Instant::now();
        sync_summaries(&store, &summaries, &mut throttle).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(600));
    }
}
