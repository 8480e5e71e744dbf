use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use shipyard_core::config::HttpConfig;
use shipyard_core::{Error, FetchedResource, HttpFetcher, Result};
use tracing::debug;

/// Image downloader backed by `reqwest`.
///
/// The request timeout lives here; the dispatcher sets none of its own.
#[derive(Clone)]
pub struct ReqwestFetcher {
    /// HTTP client for downloads.
    client: Client,
}

impl ReqwestFetcher {
    /// Builds a fetcher from HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchedResource> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::backend("http", format!("GET {url} returned {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await?.to_vec();
        debug!(
            "Fetched {} bytes from {} ({:?})",
            body.len(),
            url,
            content_type
        );

        Ok(FetchedResource { content_type, body })
    }
}
