//! Notion REST API integration.

mod client;

pub use client::NotionClient;
