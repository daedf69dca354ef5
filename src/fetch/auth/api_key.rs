use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects a fixed header into every request.
///
/// Used for the Notion integration token and the `Notion-Version` header.
/// Wrappers nest, so each one adds a single header.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Wraps `inner` so every request carries `header_name: value`.
    ///
    /// # Errors
    ///
    /// Fails if the name or value is not a valid HTTP header.
    pub fn new(inner: C, header_name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("Invalid header name {header_name:?}"))?;
        let mut value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {header_name}"))?;
        value.set_sensitive(header_name == AUTHORIZATION);

        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Convenience constructor that uses `Authorization: Bearer <key>`.
    pub fn bearer(inner: C, key: &str) -> Result<Self> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {key}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
