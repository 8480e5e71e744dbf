//! In-memory backends for testing dispatch flows.
//!
//! Each double records its calls so tests can verify exactly what the
//! dispatcher sent without making real network or filesystem calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shipyard_core::{
    CodeGenerator, Error, FetchedResource, FileStorage, Generation, GenerationRequest,
    HttpFetcher, LockOrRecover as _, ImageAnalyzer, ModelClient, ProgressEvent, ProgressSink,
    ProjectFilePath, RawImage, Result, SearchBackend, SearchResults,
};

/// Shared call log.
type History<T> = Arc<Mutex<Vec<T>>>;

/// Search backend returning a fixed result set for every query.
#[derive(Clone, Default)]
pub struct MockSearch {
    /// Results returned for every query.
    results: SearchResults,
    /// Failure message, when the backend should fail as a whole.
    failure: Option<String>,
    /// Queries received, in order.
    queries: History<String>,
}

impl MockSearch {
    /// Backend that finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend returning `images` for every query.
    #[must_use]
    pub fn with_images(images: Vec<RawImage>) -> Self {
        Self {
            results: SearchResults {
                images: Some(images),
            },
            ..Self::default()
        }
    }

    /// Backend whose every call fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Queries received so far.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock_or_recover().clone()
    }
}

#[async_trait]
impl SearchBackend for MockSearch {
    async fn search(&self, query: &str) -> Result<SearchResults> {
        self.queries.lock_or_recover().push(query.to_owned());
        match &self.failure {
            Some(message) => Err(Error::backend("search", message.clone())),
            None => Ok(self.results.clone()),
        }
    }
}

/// Canned outcome for one url.
#[derive(Clone)]
enum MockResponse {
    /// Successful response.
    Resource(FetchedResource),
    /// Network-level failure.
    Failure(String),
}

/// HTTP fetcher serving canned responses by url.
///
/// Unknown urls fail like a 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    /// Responses keyed by url.
    responses: HashMap<String, MockResponse>,
    /// Urls requested, in order.
    requests: History<String>,
}

impl MockFetcher {
    /// Fetcher with no registered urls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with `content_type` at `url`.
    #[must_use]
    pub fn with_resource(
        mut self,
        url: impl Into<String>,
        content_type: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.responses.insert(
            url.into(),
            MockResponse::Resource(FetchedResource {
                content_type: content_type.map(str::to_owned),
                body: body.into(),
            }),
        );
        self
    }

    /// Makes requests to `url` fail.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .insert(url.into(), MockResponse::Failure(message.into()));
        self
    }

    /// Urls requested so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock_or_recover().clone()
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<FetchedResource> {
        self.requests.lock_or_recover().push(url.to_owned());
        match self.responses.get(url) {
            Some(MockResponse::Resource(resource)) => Ok(resource.clone()),
            Some(MockResponse::Failure(message)) => Err(Error::backend("http", message.clone())),
            None => Err(Error::backend("http", format!("GET {url} returned 404"))),
        }
    }
}

/// Image analyzer returning a fixed reply.
#[derive(Clone, Default)]
pub struct MockAnalyzer {
    /// Reply text.
    reply: String,
    /// `(urls, prompt)` pairs received.
    calls: History<(Vec<String>, String)>,
}

impl MockAnalyzer {
    /// Analyzer answering every request with `reply`.
    #[must_use]
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Arc::default(),
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(Vec<String>, String)> {
        self.calls.lock_or_recover().clone()
    }
}

#[async_trait]
impl ImageAnalyzer for MockAnalyzer {
    async fn analyze(&self, urls: &[String], prompt: &str) -> Result<String> {
        self.calls
            .lock_or_recover()
            .push((urls.to_vec(), prompt.to_owned()));
        Ok(self.reply.clone())
    }
}

/// File storage held in memory, keyed by `project/file`.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    /// File contents by key.
    files: Arc<Mutex<HashMap<String, String>>>,
    /// Keys written, in order.
    writes: History<String>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of `path`, if it exists.
    #[must_use]
    pub fn contents(&self, path: &ProjectFilePath) -> Option<String> {
        self.files.lock_or_recover().get(&path.to_string()).cloned()
    }

    /// Keys written so far.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock_or_recover().clone()
    }
}

#[async_trait]
impl FileStorage for MemoryStorage {
    async fn write(&self, path: &ProjectFilePath, content: &str) -> Result<()> {
        let key = path.to_string();
        self.writes.lock_or_recover().push(key.clone());
        self.files
            .lock_or_recover()
            .insert(key, content.to_owned());
        Ok(())
    }

    async fn read(&self, path: &ProjectFilePath) -> Result<String> {
        self.contents(path)
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }
}

/// A recorded code-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedGeneration {
    /// Composed document.
    pub query: String,
    /// Target file.
    pub file_path: ProjectFilePath,
    /// Name of the client handle passed along.
    pub client: &'static str,
}

/// Code generator returning a fixed description.
#[derive(Clone, Default)]
pub struct MockCodeGenerator {
    /// Description returned for every request.
    description: String,
    /// Requests received.
    requests: History<RecordedGeneration>,
}

impl MockCodeGenerator {
    /// Generator answering with `description`.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            requests: Arc::default(),
        }
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedGeneration> {
        self.requests.lock_or_recover().clone()
    }
}

#[async_trait]
impl CodeGenerator for MockCodeGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        self.requests.lock_or_recover().push(RecordedGeneration {
            query: request.query,
            file_path: request.file_path,
            client: request.client.name(),
        });
        Ok(Generation {
            description: self.description.clone(),
        })
    }
}

/// Model client returning a fixed completion.
#[derive(Clone, Default)]
pub struct MockModelClient {
    /// Completion text.
    reply: String,
    /// Prompts received.
    prompts: History<String>,
}

impl MockModelClient {
    /// Client answering every prompt with `reply`.
    #[must_use]
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Arc::default(),
        }
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock_or_recover().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        self.prompts.lock_or_recover().push(prompt.to_owned());
        Ok(self.reply.clone())
    }
}

/// Progress sink that keeps every event.
#[derive(Clone, Default)]
pub struct RecordingProgress {
    /// Events received, in order.
    events: History<ProgressEvent>,
}

impl RecordingProgress {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock_or_recover()
            .iter()
            .map(|event| event.message.clone())
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock_or_recover().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_round_trip_and_not_found() {
        let storage = MemoryStorage::new();
        let path = ProjectFilePath::new("site", "app.js");

        assert!(storage.read(&path).await.unwrap_err().is_not_found());

        storage.write(&path, "seed").await.unwrap();
        assert_eq!(storage.read(&path).await.unwrap(), "seed");
        assert_eq!(storage.writes(), vec!["site/app.js".to_owned()]);
    }

    #[tokio::test]
    async fn fetcher_records_requests_in_order() {
        let fetcher = MockFetcher::new()
            .with_resource("https://a/1.png", Some("image/png"), b"png".to_vec())
            .with_failure("https://a/2.png", "connection reset");

        fetcher.get("https://a/1.png").await.unwrap();
        fetcher.get("https://a/2.png").await.unwrap_err();
        fetcher.get("https://a/3.png").await.unwrap_err();

        assert_eq!(
            fetcher.requests(),
            vec!["https://a/1.png", "https://a/2.png", "https://a/3.png"]
        );
    }
}
