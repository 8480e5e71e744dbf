use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shipyard_core::config::SearchConfig;
use shipyard_core::{Error, Result, SearchBackend, SearchResults};
use tracing::info;

/// Tavily web search, asked for images with descriptions.
pub struct TavilySearch {
    /// HTTP client for API requests.
    client: Client,
    /// Search endpoint url.
    endpoint: String,
    /// Tavily API key.
    api_key: String,
}

impl TavilySearch {
    /// Creates a search backend with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the provided API key is empty.
    pub fn new(config: &SearchConfig, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!("{} is empty", config.api_key_env)));
        }

        Ok(Self {
            client: Client::default(),
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

/// Request payload sent to the search API.
#[derive(Debug, Serialize)]
struct TavilyRequest<'query> {
    /// Search text.
    query: &'query str,
    /// Ask for image results.
    include_images: bool,
    /// Ask for a description on each image.
    include_image_descriptions: bool,
}

#[async_trait]
impl SearchBackend for TavilySearch {
    async fn search(&self, query: &str) -> Result<SearchResults> {
        info!("Searching images for {:?}", query);

        let request = TavilyRequest {
            query,
            include_images: true,
            include_image_descriptions: true,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::backend(
                "search",
                format!("API error {status}: {error_text}"),
            ));
        }

        response
            .json::<SearchResults>()
            .await
            .map_err(|err| Error::backend("search", format!("Failed to parse response: {err}")))
    }
}
