//! Registry of the tool kinds the dispatcher understands.

use core::fmt::{Display, Formatter, Result as FmtResult};

/// Closed set of tools the dispatcher can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Web search returning fetched images.
    Search,
    /// Web search returning image references.
    ImageFinder,
    /// Placeholder image references for a described slot.
    PlaceholderImage,
    /// Vision analysis of image urls.
    ImageAnalysis,
    /// Scaffold a file with seed comments.
    FileCreator,
    /// Hand a scaffolded file to code generation.
    TaskAssigner,
    /// Report the deployment link.
    DeployProject,
}

impl ToolKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 7] = [
        Self::Search,
        Self::ImageFinder,
        Self::PlaceholderImage,
        Self::ImageAnalysis,
        Self::FileCreator,
        Self::TaskAssigner,
        Self::DeployProject,
    ];

    /// Wire name the model uses for this tool.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Search => "search_tool",
            Self::ImageFinder => "image_finder_tool",
            Self::PlaceholderImage => "placeholder_image_tool",
            Self::ImageAnalysis => "image_analysis_tool",
            Self::FileCreator => "file_creator_tool",
            Self::TaskAssigner => "task_assigner_tool",
            Self::DeployProject => "deploy_project_tool",
        }
    }

    /// Returns a human-readable description of what this tool does.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Search => "Searches the web and returns matching images inline",
            Self::ImageFinder => "Searches the web and lists matching image urls",
            Self::PlaceholderImage => "Lists placeholder image urls for a described requirement",
            Self::ImageAnalysis => "Analyzes images at the given urls following a prompt",
            Self::FileCreator => "Creates a project file seeded with comments",
            Self::TaskAssigner => "Generates code for a created file from task guidelines",
            Self::DeployProject => "Returns the deployment link for the project",
        }
    }

    /// Get a kind by wire name, if it exists
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl Display for ToolKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.name())
    }
}
