//! File scaffolding and the hand-off to code generation.
//!
//! The model first calls the file creator, which seeds a file with comments,
//! then the task assigner, which feeds those comments plus task guidelines to
//! the code generator. Only the result text tells the model to make the
//! second call; a [`FileLedger`] can enforce it.

use std::sync::Arc;

use serde::Deserialize;
use shipyard_core::{
    CodeGenerator, ContentBlock, FileStorage, GenerationRequest, ProgressEvent, ProjectFilePath,
    Result, SessionContext, ToolInvocation,
};
use tracing::{debug, info};

use crate::kind::ToolKind;
use crate::ledger::FileLedger;

/// Arguments of the file creator tool.
#[derive(Debug, Deserialize)]
struct FileCreatorArgs {
    /// File name relative to the project folder.
    file_name: String,
    /// Seed content describing what the file should hold.
    file_comments: String,
}

/// Arguments of the task assigner tool.
#[derive(Debug, Deserialize)]
struct TaskAssignerArgs {
    /// File name relative to the project folder.
    file_name: String,
    /// What the generated code must do.
    task_guidelines: String,
}

/// Builds the document handed to code generation.
pub fn compose_task_document(path: &ProjectFilePath, guidelines: &str, content: &str) -> String {
    format!("Filename: {path}\n\nGuidelines: {guidelines}\n\n{content}")
}

/// Runs the file creator and task assigner tools.
#[derive(Clone)]
pub struct FileTaskPipeline {
    /// Project file store.
    storage: Arc<dyn FileStorage>,
    /// Delegated code generation.
    generator: Arc<dyn CodeGenerator>,
    /// Protocol record, when the caller tracks one.
    ledger: Option<Arc<FileLedger>>,
    /// Reject assignment of files missing from the ledger.
    strict: bool,
}

impl FileTaskPipeline {
    /// Creates a permissive pipeline with no ledger.
    pub fn new(storage: Arc<dyn FileStorage>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self {
            storage,
            generator,
            ledger: None,
            strict: false,
        }
    }

    /// Records protocol state in `ledger`; with `strict`, assignment of
    /// untracked files is rejected before storage is touched.
    #[must_use]
    pub fn with_ledger(mut self, ledger: Arc<FileLedger>, strict: bool) -> Self {
        self.ledger = Some(ledger);
        self.strict = strict;
        self
    }

    /// File creator: seeds the file and tells the model to assign it next.
    ///
    /// # Errors
    /// Returns an error if the arguments are unusable or the write fails.
    pub async fn create_file(
        &self,
        invocation: &ToolInvocation,
        session: &SessionContext,
    ) -> Result<Vec<ContentBlock>> {
        let args: FileCreatorArgs = invocation.parse_input()?;
        let path = session.file_path(&args.file_name);

        self.storage.write(&path, &args.file_comments).await?;
        session
            .progress
            .emit(ProgressEvent::progress(format!("Creating file {}", args.file_name)));
        if let Some(ledger) = &self.ledger {
            ledger.mark_created(&path);
        }
        info!("Created {}", path);

        Ok(vec![ContentBlock::text(format!(
            "File created successfully at {path}. Please assign the file immediately using {}",
            ToolKind::TaskAssigner.name()
        ))])
    }

    /// Task assigner: reads the seeded file back and hands it to code generation.
    ///
    /// # Errors
    /// Returns [`shipyard_core::Error::NotFound`] when the file does not
    /// exist, [`shipyard_core::Error::Protocol`] when a strict ledger never
    /// saw it created, and any code-generation failure.
    pub async fn assign_task(
        &self,
        invocation: &ToolInvocation,
        session: &SessionContext,
    ) -> Result<Vec<ContentBlock>> {
        let args: TaskAssignerArgs = invocation.parse_input()?;
        let path = session.file_path(&args.file_name);

        if let Some(ledger) = self.ledger.as_ref().filter(|_| self.strict) {
            ledger.ensure_assignable(&path)?;
        }

        let file_content = self.storage.read(&path).await?;
        debug!("Read {} bytes from {}", file_content.len(), path);
        let query = compose_task_document(&path, &args.task_guidelines, &file_content);

        session
            .progress
            .emit(ProgressEvent::progress(format!("Writing code for {}", args.file_name)));
        let generation = self
            .generator
            .generate(GenerationRequest {
                query,
                file_path: path.clone(),
                client: Arc::clone(&session.client),
            })
            .await?;
        session.progress.emit(ProgressEvent::progress(format!(
            "Code generated for {} ✅",
            args.file_name
        )));

        if let Some(ledger) = &self.ledger {
            ledger.mark_assigned(&path);
        }

        Ok(vec![ContentBlock::text(generation.description)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::FileState;
    use serde_json::json;
    use shipyard_core::Error;
    use shipyard_providers::{MemoryStorage, MockCodeGenerator, MockModelClient, RecordingProgress};

    struct Fixture {
        storage: MemoryStorage,
        generator: MockCodeGenerator,
        progress: RecordingProgress,
        session: SessionContext,
    }

    fn fixture() -> Fixture {
        let progress = RecordingProgress::new();
        let session = SessionContext::new(
            "bakery",
            Arc::new(progress.clone()),
            Arc::new(MockModelClient::new("code")),
        );
        Fixture {
            storage: MemoryStorage::new(),
            generator: MockCodeGenerator::new("Built the menu component"),
            progress,
            session,
        }
    }

    fn pipeline(fixture: &Fixture) -> FileTaskPipeline {
        FileTaskPipeline::new(
            Arc::new(fixture.storage.clone()),
            Arc::new(fixture.generator.clone()),
        )
    }

    fn create(file_name: &str, comments: &str) -> ToolInvocation {
        ToolInvocation::new(
            "c1",
            "file_creator_tool",
            json!({"file_name": file_name, "file_comments": comments}),
        )
    }

    fn assign(file_name: &str, guidelines: &str) -> ToolInvocation {
        ToolInvocation::new(
            "a1",
            "task_assigner_tool",
            json!({"file_name": file_name, "task_guidelines": guidelines}),
        )
    }

    #[test]
    fn compose_layout() {
        let path = ProjectFilePath::new("bakery", "menu.js");
        assert_eq!(
            compose_task_document(&path, "List pastries", "// menu"),
            "Filename: bakery/menu.js\n\nGuidelines: List pastries\n\n// menu"
        );
    }

    #[tokio::test]
    async fn create_then_assign() {
        let fixture = fixture();
        let files = pipeline(&fixture);

        let created = files
            .create_file(&create("menu.js", "// pastry menu"), &fixture.session)
            .await
            .unwrap();
        assert_eq!(
            created[0].as_text().unwrap(),
            "File created successfully at bakery/menu.js. Please assign the file immediately using task_assigner_tool"
        );

        let assigned = files
            .assign_task(&assign("menu.js", "Render a grid"), &fixture.session)
            .await
            .unwrap();
        assert_eq!(assigned, vec![ContentBlock::text("Built the menu component")]);

        let requests = fixture.generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].query,
            "Filename: bakery/menu.js\n\nGuidelines: Render a grid\n\n// pastry menu"
        );
        assert_eq!(requests[0].file_path.to_string(), "bakery/menu.js");
        assert_eq!(requests[0].client, "mock");

        assert_eq!(
            fixture.progress.messages(),
            vec![
                "Creating file menu.js",
                "Writing code for menu.js",
                "Code generated for menu.js ✅"
            ]
        );
    }

    #[tokio::test]
    async fn assign_without_create_is_not_found() {
        let fixture = fixture();
        let files = pipeline(&fixture);

        let err = files
            .assign_task(&assign("ghost.js", "anything"), &fixture.session)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(fixture.generator.requests().is_empty());
        assert!(fixture.progress.messages().is_empty());
    }

    #[tokio::test]
    async fn permissive_pipeline_assigns_preexisting_files() {
        let fixture = fixture();
        let path = ProjectFilePath::new("bakery", "legacy.js");
        fixture.storage.write(&path, "// old notes").await.unwrap();
        let files = pipeline(&fixture).with_ledger(Arc::new(FileLedger::new()), false);

        files
            .assign_task(&assign("legacy.js", "Modernize"), &fixture.session)
            .await
            .unwrap();
        assert_eq!(fixture.generator.requests().len(), 1);
    }

    #[tokio::test]
    async fn strict_ledger_rejects_untracked_files() {
        let fixture = fixture();
        let path = ProjectFilePath::new("bakery", "legacy.js");
        fixture.storage.write(&path, "// old notes").await.unwrap();
        let ledger = Arc::new(FileLedger::new());
        let files = pipeline(&fixture).with_ledger(Arc::clone(&ledger), true);

        let err = files
            .assign_task(&assign("legacy.js", "Modernize"), &fixture.session)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert!(fixture.generator.requests().is_empty());

        files
            .create_file(&create("fresh.js", "// new"), &fixture.session)
            .await
            .unwrap();
        files
            .assign_task(&assign("fresh.js", "Build"), &fixture.session)
            .await
            .unwrap();
        assert_eq!(
            ledger.state(&ProjectFilePath::new("bakery", "fresh.js")),
            Some(FileState::Assigned)
        );
    }

    #[tokio::test]
    async fn missing_arguments_are_json_errors() {
        let fixture = fixture();
        let files = pipeline(&fixture);
        let invocation =
            ToolInvocation::new("c2", "file_creator_tool", json!({"file_name": "x.js"}));

        let err = files.create_file(&invocation, &fixture.session).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(fixture.storage.writes().is_empty());
    }
}
