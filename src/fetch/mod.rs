mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request};
use serde::Serialize;
use serde_json::Value;

/// Sends a JSON request and decodes the JSON response body.
///
/// # Errors
///
/// Returns an error on transport failure, a non-2xx status (the message
/// includes the status and body), or a response that is not JSON.
pub async fn send_json<C: HttpClient + ?Sized>(
    client: &C,
    method: Method,
    url: &str,
    body: Option<&impl Serialize>,
) -> Result<Value> {
    let mut req = Request::new(method, url.parse().with_context(|| format!("Invalid URL {url}"))?);

    if let Some(body) = body {
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *req.body_mut() = Some(serde_json::to_vec(body)?.into());
    }

    let resp = client
        .execute(req)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send request to {}: {}", url, e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("API returned status {}: {}", status, body));
    }

    resp.json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))
}
