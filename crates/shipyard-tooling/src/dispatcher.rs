//! Routes one tool invocation to its flow and wraps the result envelope.

use std::sync::Arc;

use shipyard_core::config::DispatchConfig;
use shipyard_core::{
    CodeGenerator, ContentBlock, FileStorage, HttpFetcher, ImageAnalyzer, Result, SearchBackend,
    SessionContext, ToolInvocation, ToolResult,
};
use tracing::{Instrument as _, debug, info_span};

use crate::file_tasks::FileTaskPipeline;
use crate::images::{IMAGE_FINDER_LISTING, ImageResultProcessor, PLACEHOLDER_LISTING};
use crate::kind::ToolKind;
use crate::ledger::FileLedger;
use crate::responders::StaticResponders;

/// External services the dispatcher calls.
#[derive(Clone)]
pub struct Backends {
    /// Web search.
    pub search: Arc<dyn SearchBackend>,
    /// Image downloads.
    pub fetcher: Arc<dyn HttpFetcher>,
    /// Vision analysis.
    pub analyzer: Arc<dyn ImageAnalyzer>,
    /// Project file store.
    pub storage: Arc<dyn FileStorage>,
    /// Delegated code generation.
    pub generator: Arc<dyn CodeGenerator>,
}

/// What a dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The tool ran; exactly one result.
    Handled(ToolResult),
    /// The name matched no known tool. Nothing ran.
    Unhandled {
        /// The unrecognized name.
        name: String,
    },
}

impl DispatchOutcome {
    /// Whether a tool ran.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// The result, if a tool ran.
    #[must_use]
    pub fn result(&self) -> Option<&ToolResult> {
        match self {
            Self::Handled(result) => Some(result),
            Self::Unhandled { .. } => None,
        }
    }

    /// Sequence form for conversation loops: one result, or none when unhandled.
    #[must_use]
    pub fn into_results(self) -> Vec<ToolResult> {
        match self {
            Self::Handled(result) => vec![result],
            Self::Unhandled { .. } => Vec::new(),
        }
    }
}

/// Runs tool invocations against the configured backends.
///
/// Holds no per-invocation state; the optional [`FileLedger`] is the only
/// thing shared between calls.
#[derive(Clone)]
pub struct ToolDispatcher {
    /// Search, image finder, and placeholder flows.
    images: ImageResultProcessor,
    /// File creator and task assigner flows.
    files: FileTaskPipeline,
    /// Image analysis and deploy flows.
    responders: StaticResponders,
    /// Whether the file pipeline rejects untracked assignments.
    strict: bool,
}

impl ToolDispatcher {
    /// Creates a dispatcher. Strict task assignment gets a private ledger.
    #[must_use]
    pub fn new(backends: Backends, config: &DispatchConfig) -> Self {
        let files = FileTaskPipeline::new(backends.storage, backends.generator);
        let files = if config.strict_task_assignment {
            files.with_ledger(Arc::new(FileLedger::new()), true)
        } else {
            files
        };

        Self {
            images: ImageResultProcessor::new(
                backends.search,
                backends.fetcher,
                config.image_fetch_concurrency,
            ),
            files,
            responders: StaticResponders::new(backends.analyzer, config.deploy_base_url.clone()),
            strict: config.strict_task_assignment,
        }
    }

    /// Tracks file protocol state in a caller-owned ledger.
    #[must_use]
    pub fn with_ledger(mut self, ledger: Arc<FileLedger>) -> Self {
        self.files = self.files.with_ledger(ledger, self.strict);
        self
    }

    /// Runs `invocation` and wraps its content with the invocation id.
    ///
    /// Unknown tool names yield [`DispatchOutcome::Unhandled`] without
    /// touching any backend or emitting progress.
    ///
    /// # Errors
    /// Backend failures and unusable arguments propagate; per-image failures
    /// during search do not.
    pub async fn dispatch(
        &self,
        invocation: &ToolInvocation,
        session: &SessionContext,
    ) -> Result<DispatchOutcome> {
        let Some(kind) = ToolKind::from_name(&invocation.name) else {
            debug!("No tool named {:?}", invocation.name);
            return Ok(DispatchOutcome::Unhandled {
                name: invocation.name.clone(),
            });
        };

        let span = info_span!(
            "dispatch",
            tool = kind.name(),
            id = %invocation.id,
            project = %session.project_folder
        );
        let content = self.run(kind, invocation, session).instrument(span).await?;

        Ok(DispatchOutcome::Handled(ToolResult::new(
            invocation.id.clone(),
            content,
        )))
    }

    /// Runs the flow for `kind`.
    async fn run(
        &self,
        kind: ToolKind,
        invocation: &ToolInvocation,
        session: &SessionContext,
    ) -> Result<Vec<ContentBlock>> {
        match kind {
            ToolKind::Search => self.images.search_with_images(invocation).await,
            ToolKind::ImageFinder => self.images.list(IMAGE_FINDER_LISTING, invocation).await,
            ToolKind::PlaceholderImage => self.images.list(PLACEHOLDER_LISTING, invocation).await,
            ToolKind::ImageAnalysis => self.responders.analyze_images(invocation).await,
            ToolKind::FileCreator => self.files.create_file(invocation, session).await,
            ToolKind::TaskAssigner => self.files.assign_task(invocation, session).await,
            ToolKind::DeployProject => Ok(self.responders.deploy_notice(&session.project_folder)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_sequence_form() {
        let handled = DispatchOutcome::Handled(ToolResult::new(
            "t1",
            vec![ContentBlock::text("ok")],
        ));
        assert!(handled.is_handled());
        assert_eq!(handled.result().map(|result| result.tool_use_id.as_str()), Some("t1"));
        assert_eq!(handled.into_results().len(), 1);

        let unhandled = DispatchOutcome::Unhandled {
            name: "mystery_tool".to_owned(),
        };
        assert!(!unhandled.is_handled());
        assert!(unhandled.result().is_none());
        assert!(unhandled.into_results().is_empty());
    }
}
