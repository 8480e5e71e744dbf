use std::sync::Arc;

use serde::Deserialize;
use shipyard_core::{ContentBlock, ImageAnalyzer, Result, ToolInvocation};

/// Arguments of the image analysis tool.
#[derive(Debug, Deserialize)]
struct ImageAnalysisArgs {
    /// Images to look at.
    image_urls: Vec<String>,
    /// What to look for.
    analysis_prompt: String,
}

/// Deployment link for `project` under `base_url`.
pub fn deploy_url(base_url: &str, project: &str) -> String {
    format!("{}/{project}", base_url.trim_end_matches('/'))
}

/// Tools that answer with a single text block.
#[derive(Clone)]
pub struct StaticResponders {
    /// Vision backend.
    analyzer: Arc<dyn ImageAnalyzer>,
    /// Base url deploy links are built from.
    deploy_base_url: String,
}

impl StaticResponders {
    /// Creates the responders.
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>, deploy_base_url: impl Into<String>) -> Self {
        Self {
            analyzer,
            deploy_base_url: deploy_base_url.into(),
        }
    }

    /// Forwards urls and prompt to the analyzer as-is.
    ///
    /// # Errors
    /// Returns an error if the arguments are unusable or the analyzer fails.
    pub async fn analyze_images(&self, invocation: &ToolInvocation) -> Result<Vec<ContentBlock>> {
        let args: ImageAnalysisArgs = invocation.parse_input()?;
        let analysis = self
            .analyzer
            .analyze(&args.image_urls, &args.analysis_prompt)
            .await?;
        Ok(vec![ContentBlock::text(analysis)])
    }

    /// Deployment notice. Depends only on `project`.
    #[must_use]
    pub fn deploy_notice(&self, project: &str) -> Vec<ContentBlock> {
        vec![ContentBlock::text(format!(
            "Your project has been deployed on the link: {}",
            deploy_url(&self.deploy_base_url, project)
        ))]
    }
}
