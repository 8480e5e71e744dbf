//! Tool dispatch for the Shipyard coding agent.
//!
//! This crate turns one model tool call into one result envelope:
//! - `ToolDispatcher` classifies the call and wraps the result
//! - `ImageResultProcessor` runs the search-backed image tools
//! - `FileTaskPipeline` scaffolds files and hands them to code generation
//! - `StaticResponders` answers image analysis and deploy requests
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Allow for tests"
    )
)]

/// Invocation routing and result envelopes.
mod dispatcher;
/// File creator and task assigner flows.
mod file_tasks;
/// Search-backed image flows.
mod images;
/// Tool kind registry.
mod kind;
/// Per-file protocol state.
mod ledger;
/// Ordered iteration with isolated failures.
mod ordered;
/// Single-text-block tools.
mod responders;

pub use dispatcher::{Backends, DispatchOutcome, ToolDispatcher};
pub use file_tasks::{FileTaskPipeline, compose_task_document};
pub use images::{
    ACCEPTED_MEDIA_TYPES, IMAGE_FINDER_LISTING, ImageFetchError, ImageListing,
    ImageResultProcessor, PLACEHOLDER_LISTING, accepted_media_type, normalize_hits,
};
pub use kind::ToolKind;
pub use ledger::{FileLedger, FileState};
pub use ordered::{ItemFailure, OrderedOutcome, ordered_isolated};
pub use responders::{StaticResponders, deploy_url};
