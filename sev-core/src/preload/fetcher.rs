//! Asset fetching
//!
//! A fetch proves an asset is retrievable: the request must succeed and the
//! whole body must stream through. The bytes themselves are discarded as
//! they arrive; warming the HTTP cache is the only lasting effect.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

/// Retrieves one asset by manifest path
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch an asset in full, returning the number of bytes retrieved
    async fn fetch(&self, path: &str) -> Result<u64, FetchError>;
}

/// HTTP GET fetcher resolving manifest paths against a base URL
///
/// No timeout is configured: a request that never settles stalls the
/// preloader, matching the fail-open, retry-free gate policy.
pub struct HttpFetcher {
    http_client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            http_client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a manifest path (absolute URL or path relative to the base)
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<u64, FetchError> {
        let url = self.resolve(path)?;

        let mut response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut total = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            total += chunk.len() as u64;
        }

        debug!(%url, bytes = total, "Asset retrieved");
        Ok(total)
    }
}
