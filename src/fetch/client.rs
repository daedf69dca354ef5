use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Auth wrappers and test fakes implement this
/// so API clients stay independent of the transport.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
