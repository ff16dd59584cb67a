//! Progressive fragment download with cancellation checkpoints

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::cancel::CancellationToken;
use crate::config::schema::HttpConfig;
use crate::error::{FragError, Result};

/// Unified interface for fetching one fragment with progress reporting
#[async_trait]
pub trait FragmentFetcher: Send + Sync {
    /// Fetch the resource at `url`, reporting download progress as it goes.
    ///
    /// # Arguments
    /// * `on_progress` - Called with `Some(fraction)` in `[0, 1]` when the
    ///   total size is known, or once with `None` when it isn't. Both modes
    ///   finish with `Some(1.0)` once the body is complete.
    /// * `cancel` - Checked before the request and between chunk reads;
    ///   a triggered token aborts with `FragError::Cancelled`.
    async fn fetch(
        &self,
        url: &str,
        on_progress: &mut (dyn FnMut(Option<f64>) + Send),
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>>;
}

/// HTTP fetcher streaming response bodies chunk by chunk
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create an HTTP fetcher from HTTP config
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| FragError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FragmentFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        on_progress: &mut (dyn FnMut(Option<f64>) + Send),
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        cancel.check()?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FragError::Fetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FragError::Fetch(format!("HTTP {status} fetching {url}")));
        }

        // Zero or missing content-length means the size can't be trusted,
        // so progress switches to indeterminate.
        let total = response.content_length().filter(|t| *t > 0);
        if total.is_none() {
            on_progress(None);
        }

        let mut body = Vec::new();
        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            cancel.check()?;
            let chunk =
                chunk.map_err(|e| FragError::Fetch(format!("stream from {url} failed: {e}")))?;
            received += chunk.len() as u64;
            body.extend_from_slice(&chunk);

            if let Some(total) = total {
                on_progress(Some((received as f64 / total as f64).min(1.0)));
            }
        }

        tracing::debug!("Fetched {} byte(s) from {}", body.len(), url);
        on_progress(Some(1.0));
        Ok(body)
    }
}
