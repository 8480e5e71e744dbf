use std::sync::Arc;

use crate::{ClientHandle, ProgressSink, ProjectFilePath};

/// Per-call bundle handed to the dispatcher alongside an invocation.
///
/// Read-only from the dispatcher's point of view except for the progress
/// sink, which it writes to.
#[derive(Clone)]
pub struct SessionContext {
    /// Folder every project file lives under.
    pub project_folder: String,
    /// Where status updates go.
    pub progress: Arc<dyn ProgressSink>,
    /// Model client forwarded to code generation.
    pub client: ClientHandle,
}

impl SessionContext {
    /// Bundles the per-call collaborators.
    pub fn new(
        project_folder: impl Into<String>,
        progress: Arc<dyn ProgressSink>,
        client: ClientHandle,
    ) -> Self {
        Self {
            project_folder: project_folder.into(),
            progress,
            client,
        }
    }

    /// Storage key for `file_name` in this session's project.
    #[must_use]
    pub fn file_path(&self, file_name: &str) -> ProjectFilePath {
        ProjectFilePath::new(self.project_folder.clone(), file_name)
    }
}
