//! Backend adapters for the external services a dispatch calls.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

/// OpenAI-compatible chat completions client.
pub mod chat;
/// Code generation through the session's model client.
pub mod codegen;
/// `reqwest` image downloader.
pub mod http;
/// In-memory doubles used by tests.
pub mod mock;
/// Filesystem project storage.
pub mod storage;
/// Tavily image search.
pub mod tavily;
/// Placeholder for backends missing their API key.
pub mod unconfigured;

pub use chat::ChatCompletionsClient;
pub use codegen::ModelCodeGenerator;
pub use http::ReqwestFetcher;
pub use mock::{
    MemoryStorage, MockAnalyzer, MockCodeGenerator, MockFetcher, MockModelClient, MockSearch,
    RecordedGeneration, RecordingProgress,
};
pub use storage::LocalFileStorage;
pub use tavily::TavilySearch;
pub use unconfigured::Unconfigured;
