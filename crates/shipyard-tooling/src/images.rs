//! Image search flows: inline fetched images or listed references.

use core::result::Result as CoreResult;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, to_string_pretty};
use shipyard_core::{
    ContentBlock, Error, HttpFetcher, ImageHit, Result, SearchBackend, SearchResults,
    ToolInvocation,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::ordered::ordered_isolated;

/// Content types an image block may carry.
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Why one image was left out of a search result.
#[derive(Debug, Error)]
pub enum ImageFetchError {
    /// The response declared a content type outside the whitelist.
    #[error("Unsupported media type {content_type} for image {url}")]
    UnsupportedMediaType {
        /// Image url.
        url: String,
        /// Declared content type, or `none`.
        content_type: String,
    },
    /// The download itself failed.
    #[error("Error processing image {url}: {source}")]
    Fetch {
        /// Image url.
        url: String,
        /// Underlying failure.
        #[source]
        source: Error,
    },
}

/// Parameters of a reference-listing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageListing {
    /// Input field holding the search query.
    pub query_field: &'static str,
    /// Text returned when nothing was found.
    pub empty_text: &'static str,
}

/// Listing used by the image finder tool.
pub const IMAGE_FINDER_LISTING: ImageListing = ImageListing {
    query_field: "query",
    empty_text: "No relevant images found",
};

/// Listing used by the placeholder image tool.
pub const PLACEHOLDER_LISTING: ImageListing = ImageListing {
    query_field: "placeholder_image_requirements",
    empty_text: "No relevant placeholder images found",
};

/// Arguments of the search tool.
#[derive(Debug, Deserialize)]
struct SearchArgs {
    /// Search text.
    query: String,
}

/// Turns raw search output into hits, dropping entries without a usable url.
pub fn normalize_hits(results: &SearchResults) -> Vec<ImageHit> {
    results
        .images
        .iter()
        .flatten()
        .filter_map(|raw| {
            raw.url()
                .map(|url| ImageHit::new(url, raw.description().map(str::to_owned)))
        })
        .collect()
}

/// Maps a declared content type onto the whitelist.
///
/// Parameters such as `; charset=binary` are ignored and matching is
/// case-insensitive.
pub fn accepted_media_type(content_type: Option<&str>) -> Option<&'static str> {
    let essence = content_type?.split(';').next()?.trim();
    ACCEPTED_MEDIA_TYPES
        .into_iter()
        .find(|accepted| accepted.eq_ignore_ascii_case(essence))
}

/// Runs the search-backed tools.
#[derive(Clone)]
pub struct ImageResultProcessor {
    /// Search backend.
    search: Arc<dyn SearchBackend>,
    /// Image downloader.
    fetcher: Arc<dyn HttpFetcher>,
    /// Downloads allowed in flight at once.
    concurrency: usize,
}

impl ImageResultProcessor {
    /// Creates a processor. A `concurrency` of 1 downloads strictly in order.
    pub fn new(
        search: Arc<dyn SearchBackend>,
        fetcher: Arc<dyn HttpFetcher>,
        concurrency: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Search tool: a lead-in text block followed by every whitelisted image,
    /// in hit order.
    ///
    /// # Errors
    /// Returns an error if the arguments are unusable or the search itself fails.
    /// Individual image failures are logged and skipped.
    pub async fn search_with_images(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<Vec<ContentBlock>> {
        let args: SearchArgs = invocation.parse_input()?;
        let hits = normalize_hits(&self.search.search(&args.query).await?);

        let mut content = vec![ContentBlock::text(format!(
            "Here are relevant images found for the query \"{}\". These images may be useful for designing and creating components for the website:",
            args.query
        ))];

        let outcome = ordered_isolated(&hits, self.concurrency, |hit| self.fetch_block(hit)).await;
        for failure in &outcome.failures {
            warn!("Skipping image {}: {}", failure.index, failure.error);
        }
        info!(
            "Search {:?}: {} hit(s), {} image(s) attached",
            args.query,
            hits.len(),
            outcome.successes.len()
        );

        content.extend(outcome.successes);
        Ok(content)
    }

    /// Image finder and placeholder tools: one text block listing the hits as JSON.
    ///
    /// # Errors
    /// Returns an error if the query field is missing or the search fails.
    pub async fn list(
        &self,
        listing: ImageListing,
        invocation: &ToolInvocation,
    ) -> Result<Vec<ContentBlock>> {
        let query = invocation
            .input
            .get(listing.query_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "{} requires a '{}' parameter",
                    invocation.name, listing.query_field
                ))
            })?;

        let hits = normalize_hits(&self.search.search(query).await?);
        let text = if hits.is_empty() {
            listing.empty_text.to_owned()
        } else {
            to_string_pretty(&hits)?
        };

        Ok(vec![ContentBlock::text(text)])
    }

    /// Downloads one hit and encodes it as an image block.
    async fn fetch_block(&self, hit: &ImageHit) -> CoreResult<ContentBlock, ImageFetchError> {
        let resource = self
            .fetcher
            .get(&hit.url)
            .await
            .map_err(|source| ImageFetchError::Fetch {
                url: hit.url.clone(),
                source,
            })?;

        let Some(media_type) = accepted_media_type(resource.content_type.as_deref()) else {
            return Err(ImageFetchError::UnsupportedMediaType {
                url: hit.url.clone(),
                content_type: resource.content_type.unwrap_or_else(|| "none".to_owned()),
            });
        };

        Ok(ContentBlock::base64_image(
            media_type,
            STANDARD.encode(&resource.body),
        ))
    }
}
