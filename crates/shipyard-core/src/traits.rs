//! Contracts for the external services a dispatch depends on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProjectFilePath, Result};

/// Shared handle to the language model driving code generation.
pub type ClientHandle = Arc<dyn ModelClient>;

/// Raw response of a search backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// Image entries in relevance order, if the backend returned any.
    #[serde(default)]
    pub images: Option<Vec<RawImage>>,
}

/// An unvalidated image entry as returned by a search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawImage {
    /// Bare url string.
    Url(String),
    /// Object entry with optional fields.
    Described {
        /// Location, which may be absent or not a string.
        #[serde(default)]
        url: Option<Value>,
        /// Description, which may be absent or not a string.
        #[serde(default)]
        description: Option<Value>,
    },
    /// Anything else the backend sent.
    Other(Value),
}

impl RawImage {
    /// The url when it is a non-empty string.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            Self::Url(url) => Some(url.as_str()),
            Self::Described { url, .. } => url.as_ref().and_then(Value::as_str),
            Self::Other(_) => None,
        };
        url.filter(|url| !url.is_empty())
    }

    /// The description when it is a string.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Described { description, .. } => description.as_ref().and_then(Value::as_str),
            Self::Url(_) | Self::Other(_) => None,
        }
    }
}

/// Web search returning image references.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs a search for `query`.
    ///
    /// # Errors
    /// Returns an error when the backend call fails as a whole.
    async fn search(&self, query: &str) -> Result<SearchResults>;
}

/// Vision model that describes a set of images.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Analyzes `urls` following `prompt`.
    ///
    /// # Errors
    /// Returns an error when the backend call fails.
    async fn analyze(&self, urls: &[String], prompt: &str) -> Result<String>;
}

/// Project file store addressed by [`ProjectFilePath`].
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `content`, replacing any existing file.
    ///
    /// # Errors
    /// Returns an error when the write fails.
    async fn write(&self, path: &ProjectFilePath, content: &str) -> Result<()>;

    /// Reads a file back.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotFound`] when the file does not exist.
    async fn read(&self, path: &ProjectFilePath) -> Result<String>;
}

/// A resource fetched over HTTP.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Declared `content-type` header, if present.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

/// Outbound HTTP used to download images.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetches `url`.
    ///
    /// # Errors
    /// Returns an error on network failure or a non-success status.
    async fn get(&self, url: &str) -> Result<FetchedResource>;
}

/// Language model client carried through the session.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Returns the unique identifier for this client.
    fn name(&self) -> &'static str;

    /// Completes `prompt` under `system` instructions.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response cannot be parsed.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Request handed to the delegated code-generation backend.
#[derive(Clone)]
pub struct GenerationRequest {
    /// Composed document: header followed by the seed content.
    pub query: String,
    /// File the generated code belongs to.
    pub file_path: ProjectFilePath,
    /// Model client from the session.
    pub client: ClientHandle,
}

/// Outcome of a code-generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Summary returned to the model.
    pub description: String,
}

/// Delegated code generation for one file.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Generates code for `request.file_path`.
    ///
    /// # Errors
    /// Returns an error when generation fails.
    async fn generate(&self, request: GenerationRequest) -> Result<Generation>;
}
