//! Notion credentials and database layout, read from the environment.

use anyhow::{Result, anyhow};

pub const DEFAULT_API_BASE: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Names of the database properties the summaries are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub title: String,
    pub average_rating: String,
    pub favorites: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            title: "Book Title".to_string(),
            average_rating: "Average Rating".to_string(),
            favorites: "Favorites".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: String,
    pub database_id: String,
    pub api_base: String,
    pub notion_version: String,
    pub properties: PropertyNames,
}

impl NotionConfig {
    /// Reads the config from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// `NOTION_KEY` and `NOTION_DATABASE_ID` are required; every other
    /// variable falls back to its default. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("{key} must be set"));

        let defaults = PropertyNames::default();

        Ok(Self {
            api_key: require("NOTION_KEY")?,
            database_id: require("NOTION_DATABASE_ID")?,
            api_base: get("NOTION_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            notion_version: get("NOTION_VERSION")
                .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string()),
            properties: PropertyNames {
                title: get("NOTION_TITLE_PROPERTY").unwrap_or(defaults.title),
                average_rating: get("NOTION_AVERAGE_PROPERTY").unwrap_or(defaults.average_rating),
                favorites: get("NOTION_FAVORITES_PROPERTY").unwrap_or(defaults.favorites),
            },
        })
    }
}
