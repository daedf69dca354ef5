use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::{NotionConfig, PropertyNames};
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, send_json};
use crate::services::record_store::{ExistingRecord, ExistingRecords, RecordStore};
use crate::stats::round_to;

/// [`RecordStore`] backed by a Notion database.
pub struct NotionClient<C> {
    http: C,
    base_url: String,
    database_id: String,
    properties: PropertyNames,
}

impl NotionClient<ApiKey<ApiKey<BasicClient>>> {
    /// Builds a client with bearer auth and the `Notion-Version` header.
    pub fn from_config(config: &NotionConfig) -> Result<Self> {
        let http = ApiKey::bearer(BasicClient::new()?, &config.api_key)?;
        let http = ApiKey::new(http, "Notion-Version", &config.notion_version)?;

        Ok(Self::with_http(http, config))
    }
}

impl<C: HttpClient> NotionClient<C> {
    /// Uses `http` as-is; it must already add any auth headers.
    pub fn with_http(http: C, config: &NotionConfig) -> Self {
        Self {
            http,
            base_url: config.api_base.clone(),
            database_id: config.database_id.clone(),
            properties: config.properties.clone(),
        }
    }

    /// Property payload shared by create and update.
    fn page_properties(
        &self,
        display_title: Option<&str>,
        average_rating: f64,
        favorite_count: usize,
    ) -> Value {
        let mut properties = json!({
            self.properties.average_rating.as_str(): {
                "type": "number",
                "number": round_to(average_rating, 2),
            },
            self.properties.favorites.as_str(): {
                "type": "number",
                "number": favorite_count,
            },
        });

        if let Some(title) = display_title {
            properties[self.properties.title.as_str()] = json!({
                "type": "title",
                "title": [{ "type": "text", "text": { "content": title } }],
            });
        }

        properties
    }

    /// Extracts `(id, title)` from one query result. Pages without either are skipped.
    fn existing_record(&self, page: &Value) -> Option<ExistingRecord> {
        let id = page["id"].as_str()?.to_string();
        let first = &page["properties"][self.properties.title.as_str()]["title"][0];
        let title = first["text"]["content"]
            .as_str()
            .or_else(|| first["plain_text"].as_str())?
            .to_string();

        Some(ExistingRecord { id, title })
    }
}

#[async_trait]
impl<C: HttpClient> RecordStore for NotionClient<C> {
    #[tracing::instrument(skip(self), fields(database_id = %self.database_id))]
    async fn list_existing(&self) -> Result<ExistingRecords> {
        let url = format!("{}/databases/{}/query", self.base_url, self.database_id);

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = match &cursor {
                Some(c) => json!({ "start_cursor": c }),
                None => json!({}),
            };

            let page = send_json(&self.http, Method::POST, &url, Some(&body))
                .await
                .context("Failed to query existing pages")?;

            let results = page["results"].as_array().map(Vec::as_slice).unwrap_or_default();
            debug!(count = results.len(), "Fetched page of existing records");
            records.extend(results.iter().filter_map(|p| self.existing_record(p)));

            cursor = match (page["has_more"].as_bool(), page["next_cursor"].as_str()) {
                (Some(true), Some(next)) => Some(next.to_string()),
                _ => break,
            };
        }

        Ok(records.into_iter().collect())
    }

    async fn create_record(
        &self,
        display_title: &str,
        average_rating: f64,
        favorite_count: usize,
    ) -> Result<String> {
        let url = format!("{}/pages", self.base_url);
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": self.page_properties(Some(display_title), average_rating, favorite_count),
        });

        let page = send_json(&self.http, Method::POST, &url, Some(&body))
            .await
            .with_context(|| format!("Failed to create page for {display_title:?}"))?;

        page["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Created page for {display_title:?} has no id"))
    }

    async fn update_record(
        &self,
        record_id: &str,
        average_rating: f64,
        favorite_count: usize,
    ) -> Result<()> {
        let url = format!("{}/pages/{}", self.base_url, record_id);
        let body = json!({
            "properties": self.page_properties(None, average_rating, favorite_count),
        });

        send_json(&self.http, Method::PATCH, &url, Some(&body))
            .await
            .with_context(|| format!("Failed to update page {record_id}"))?;

        Ok(())
    }
}
