//! Core types and traits for the Shipyard tool-dispatch engine.
//!
//! This crate provides the tool invocation and result envelopes, error
//! handling, configuration, progress events, and the trait definitions for
//! every external backend a dispatch may call.
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

/// Configuration loading and validation.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Progress events and sinks.
pub mod progress;
/// Per-call session bundle.
pub mod session;
/// Poison-tolerant locking.
pub mod sync;
/// Trait definitions for external backends.
pub mod traits;
/// Invocation, result, and content types.
pub mod types;

pub use config::ShipyardConfig;
pub use error::{Error, Result};
pub use progress::{NullProgress, ProgressChannel, ProgressEvent, ProgressKind, ProgressSink};
pub use session::SessionContext;
pub use sync::LockOrRecover;
pub use traits::{
    ClientHandle, CodeGenerator, FetchedResource, FileStorage, Generation, GenerationRequest,
    HttpFetcher, ImageAnalyzer, ModelClient, RawImage, SearchBackend, SearchResults,
};
pub use types::{
    ContentBlock, DEFAULT_IMAGE_DESCRIPTION, ImageEncoding, ImageHit, ImageSource,
    ProjectFilePath, ToolInvocation, ToolResult,
};
