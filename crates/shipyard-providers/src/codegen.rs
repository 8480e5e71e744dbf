use std::sync::Arc;

use async_trait::async_trait;
use shipyard_core::{CodeGenerator, FileStorage, Generation, GenerationRequest, Result};
use tracing::info;

/// Instructions sent with every code-generation request.
const CODEGEN_SYSTEM_PROMPT: &str = "You are a senior front-end engineer. You receive a file name, task guidelines, and the file's current notes. Reply with the complete contents of that file and nothing else.";

/// Code generator that writes the session model's answer back into storage.
pub struct ModelCodeGenerator {
    /// Store the generated file is written to.
    storage: Arc<dyn FileStorage>,
}

impl ModelCodeGenerator {
    /// Creates a generator writing into `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }
}

/// Removes one surrounding markdown code fence, if the model added one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = after_open.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening line.
    body.split_once('\n')
        .map_or(body, |(_, rest)| rest)
        .trim_end()
}

#[async_trait]
impl CodeGenerator for ModelCodeGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation> {
        info!(
            "Generating {} with {}",
            request.file_path,
            request.client.name()
        );

        let answer = request
            .client
            .complete(CODEGEN_SYSTEM_PROMPT, &request.query)
            .await?;
        let code = strip_code_fence(&answer);

        self.storage.write(&request.file_path, code).await?;

        Ok(Generation {
            description: format!(
                "Code for {} has been written ({} lines).",
                request.file_path,
                code.lines().count()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryStorage, MockModelClient};
    use shipyard_core::{ClientHandle, ProjectFilePath};

    #[test]
    fn strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```jsx\nconst a = 1;\n```"), "const a = 1;");
        assert_eq!(strip_code_fence("```\nplain\n```\n"), "plain");
        assert_eq!(strip_code_fence("  no fence  "), "no fence");
        assert_eq!(strip_code_fence("```unterminated"), "```unterminated");
    }

    #[tokio::test]
    async fn generated_code_is_written_back() {
        let storage = Arc::new(MemoryStorage::new());
        let client: ClientHandle = Arc::new(MockModelClient::new(
            "```html\n<h1>Fresh bread</h1>\n<p>Daily</p>\n```",
        ));
        let generator = ModelCodeGenerator::new(Arc::clone(&storage) as Arc<dyn FileStorage>);
        let path = ProjectFilePath::new("bakery", "index.html");

        let generation = generator
            .generate(GenerationRequest {
                query: "Filename: bakery/index.html".to_owned(),
                file_path: path.clone(),
                client,
            })
            .await
            .unwrap();

        assert_eq!(
            storage.contents(&path).as_deref(),
            Some("<h1>Fresh bread</h1>\n<p>Daily</p>")
        );
        assert_eq!(
            generation.description,
            "Code for bakery/index.html has been written (2 lines)."
        );
    }
}
