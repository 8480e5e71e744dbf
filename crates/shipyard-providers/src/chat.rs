use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shipyard_core::config::ModelConfig;
use shipyard_core::{Error, ImageAnalyzer, ModelClient, Result};
use tracing::info;

/// System prompt used for image analysis requests.
const ANALYSIS_SYSTEM_PROMPT: &str = "You are a web design assistant. Describe the supplied images precisely, focusing on layout, color palette, typography, and components a developer would need to reproduce them.";

/// OpenAI-compatible chat completions client.
///
/// Serves both as the session's model handle and as the image-analysis backend.
pub struct ChatCompletionsClient {
    /// HTTP client for API requests.
    client: Client,
    /// Chat completions endpoint.
    endpoint: String,
    /// API key sent as bearer token.
    api_key: String,
    /// Model name to use.
    model: String,
}

impl ChatCompletionsClient {
    /// Creates a client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the provided API key is empty.
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!("{} is empty", config.api_key_env)));
        }

        Ok(Self {
            client: Client::default(),
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Sends `messages` and returns the first choice's text.
    async fn send(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(Error::backend(
                "model",
                format!("API error {status}: {error_text}"),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|err| Error::backend("model", format!("Failed to parse response: {err}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::backend("model", "No response from model"))
    }
}

/// Request payload sent to the chat completions API.
#[derive(Debug, Serialize)]
struct ChatRequest<'model> {
    /// Model identifier.
    model: &'model str,
    /// Conversation for the request.
    messages: Vec<ChatMessage>,
    /// Sampling temperature.
    temperature: f32,
}

/// Message delivered to the API.
#[derive(Debug, Serialize)]
struct ChatMessage {
    /// Role of the message author (`system` or `user`).
    role: &'static str,
    /// Plain string or an array of content parts.
    content: Value,
}

/// Response payload.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Candidate completions.
    choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Generated message.
    message: ChatResponseMessage,
}

/// Response message containing the generated text.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Generated text content.
    content: Option<String>,
}

/// Builds the user message for a vision request: prompt first, then one part per url.
fn vision_message(urls: &[String], prompt: &str) -> ChatMessage {
    let mut parts = vec![json!({"type": "text", "text": prompt})];
    parts.extend(
        urls.iter()
            .map(|url| json!({"type": "image_url", "image_url": {"url": url}})),
    );
    ChatMessage {
        role: "user",
        content: Value::Array(parts),
    }
}

#[async_trait]
impl ModelClient for ChatCompletionsClient {
    fn name(&self) -> &'static str {
        "chat-completions"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.send(vec![
            ChatMessage {
                role: "system",
                content: Value::String(system.to_owned()),
            },
            ChatMessage {
                role: "user",
                content: Value::String(prompt.to_owned()),
            },
        ])
        .await
    }
}

#[async_trait]
impl ImageAnalyzer for ChatCompletionsClient {
    async fn analyze(&self, urls: &[String], prompt: &str) -> Result<String> {
        info!("Analyzing {} image(s)", urls.len());
        self.send(vec![
            ChatMessage {
                role: "system",
                content: Value::String(ANALYSIS_SYSTEM_PROMPT.to_owned()),
            },
            vision_message(urls, prompt),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_value, to_value};

    #[test]
    fn vision_message_puts_prompt_before_images() {
        let message = vision_message(
            &["https://a.example/1.png".to_owned(), "https://a.example/2.png".to_owned()],
            "Compare the headers",
        );

        assert_eq!(message.role, "user");
        assert_eq!(
            to_value(&message.content).unwrap(),
            json!([
                {"type": "text", "text": "Compare the headers"},
                {"type": "image_url", "image_url": {"url": "https://a.example/1.png"}},
                {"type": "image_url", "image_url": {"url": "https://a.example/2.png"}}
            ])
        );
    }

    #[test]
    fn response_without_content_parses() {
        let response: ChatResponse =
            from_value(json!({"choices": [{"message": {"role": "assistant", "content": null}}]}))
                .unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn client_with_api_key() {
        let config = ModelConfig {
            model: "gpt-4o-mini".to_owned(),
            ..ModelConfig::default()
        };
        let client = ChatCompletionsClient::new(&config, "test_key".to_owned()).unwrap();

        assert_eq!(client.name(), "chat-completions");
        assert_eq!(client.model, "gpt-4o-mini");
        assert!(matches!(
            ChatCompletionsClient::new(&config, String::new()),
            Err(Error::Config(_))
        ));
    }
}
