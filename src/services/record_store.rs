//! Trait and types for the remote store that book summaries are synced into.

use anyhow::Result;
use std::collections::HashMap;

/// A record that already exists in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    pub id: String,
    pub title: String,
}

/// Index of existing records keyed by lowercased title.
#[derive(Debug, Default, Clone)]
pub struct ExistingRecords {
    by_title: HashMap<String, String>,
}

impl ExistingRecords {
    /// Returns the record id whose title matches `normalized_title`.
    pub fn lookup_existing_by_title(&self, normalized_title: &str) -> Option<&str> {
        self.by_title.get(normalized_title).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }
}

/// Builds the index. Titles are trimmed and lowercased. For duplicate
/// titles the last record wins.
impl FromIterator<ExistingRecord> for ExistingRecords {
    fn from_iter<I: IntoIterator<Item = ExistingRecord>>(iter: I) -> Self {
        let by_title = iter
            .into_iter()
            .map(|r| (r.title.trim().to_lowercase(), r.id))
            .collect();
        Self { by_title }
    }
}

/// Abstraction over a structured store that holds one record per book.
#[async_trait::async_trait]
pub trait RecordStore {
    /// Fetches every existing record once, at the start of a sync batch.
    async fn list_existing(&self) -> Result<ExistingRecords>;

    /// Creates a record and returns its id.
    async fn create_record(
        &self,
        display_title: &str,
        average_rating: f64,
        favorite_count: usize,
    ) -> Result<String>;

    async fn update_record(
        &self,
        record_id: &str,
        average_rating: f64,
        favorite_count: usize,
    ) -> Result<()>;
}
