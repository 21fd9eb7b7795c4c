use super::HistoryError;
use reqwest::Client;
use std::time::Duration;
use tracing::trace;

/// Raw response to a page request.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// Network seam for the history pipeline.
///
/// Implementations only report what the server said; status validation is
/// left to the caller.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    /// Lightweight existence check. Returns the response status.
    async fn head(&self, url: &str) -> Result<u16, HistoryError>;

    /// Fetch the full page body.
    async fn get(&self, url: &str) -> Result<PageResponse, HistoryError>;
}

/// `PageSource` backed by a shared reqwest client.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, HistoryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jobhistory/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(HistoryError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PageSource for HttpSource {
    async fn head(&self, url: &str) -> Result<u16, HistoryError> {
        let resp = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| HistoryError::fetch(url, e))?;
        trace!(url, status = resp.status().as_u16(), "HEAD");
        Ok(resp.status().as_u16())
    }

    async fn get(&self, url: &str) -> Result<PageResponse, HistoryError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HistoryError::fetch(url, e))?;
        let status = resp.status().as_u16();
        trace!(url, status, "GET");
        let body = resp
            .text()
            .await
            .map_err(|e| HistoryError::fetch(url, e))?;
        Ok(PageResponse { status, body })
    }
}
