use crate::assets::AssetBase;
use crate::catalog::schema::Catalog;
use crate::config::schema::HttpConfig;
use crate::error::{FragError, Result};

/// HTTP client for fetching and validating the model catalog
pub struct CatalogClient {
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a catalog client from HTTP config
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| FragError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetches the catalog from `url` and validates it.
    ///
    /// Sends `Cache-Control: no-cache` so edits to the catalog show up
    /// without waiting out intermediary caches.
    pub async fn load(&self, url: &str) -> Result<Catalog> {
        tracing::debug!("Fetching catalog from {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| FragError::Fetch(format!("catalog request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FragError::Fetch(format!(
                "catalog request to {url} failed: HTTP {status}"
            )));
        }

        let body = response.text().await.map_err(|e| {
            FragError::Fetch(format!("catalog body from {url} could not be read: {e}"))
        })?;

        let catalog = Catalog::from_json(&body)?;
        tracing::info!("Catalog loaded: {} package(s)", catalog.packages().len());
        Ok(catalog)
    }
}

/// Conventional catalog location under an asset base
#[must_use]
pub fn default_catalog_url(base: &AssetBase) -> String {
    base.resolve("models.json")
}
