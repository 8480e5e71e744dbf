//! Builds the dispatcher backends from configuration.

use std::sync::Arc;

use shipyard_core::{
    ClientHandle, FileStorage, ImageAnalyzer, Result, SearchBackend, ShipyardConfig,
};
use shipyard_providers::{
    ChatCompletionsClient, LocalFileStorage, ModelCodeGenerator, ReqwestFetcher, TavilySearch,
    Unconfigured,
};
use shipyard_tooling::Backends;
use tracing::debug;

/// Backends plus the model handle placed in the session.
pub struct Wiring {
    /// Dispatcher backends.
    pub backends: Backends,
    /// Session model handle.
    pub client: ClientHandle,
}

/// Wires the real adapters. A missing API key leaves its backend
/// [`Unconfigured`], so only tools that reach it fail.
pub fn wire(config: &ShipyardConfig) -> Result<Wiring> {
    let (client, analyzer) = model_backends(config)?;

    let search: Arc<dyn SearchBackend> = match config.search_api_key() {
        Ok(key) => Arc::new(TavilySearch::new(&config.search, key)?),
        Err(err) => {
            debug!("Search left unconfigured: {}", err);
            Arc::new(Unconfigured::new("search", config.search.api_key_env.clone()))
        }
    };

    let storage: Arc<dyn FileStorage> =
        Arc::new(LocalFileStorage::new(&config.storage.root_path));
    let generator = Arc::new(ModelCodeGenerator::new(Arc::clone(&storage)));

    Ok(Wiring {
        backends: Backends {
            search,
            fetcher: Arc::new(ReqwestFetcher::new(&config.http)?),
            analyzer,
            storage,
            generator,
        },
        client,
    })
}

/// The chat completions client serves as both session model and analyzer.
fn model_backends(config: &ShipyardConfig) -> Result<(ClientHandle, Arc<dyn ImageAnalyzer>)> {
    match config.model_api_key() {
        Ok(key) => {
            let chat = Arc::new(ChatCompletionsClient::new(&config.model, key)?);
            let analyzer: Arc<dyn ImageAnalyzer> = Arc::<ChatCompletionsClient>::clone(&chat);
            let client: ClientHandle = chat;
            Ok((client, analyzer))
        }
        Err(err) => {
            debug!("Model left unconfigured: {}", err);
            let missing = Arc::new(Unconfigured::new("model", config.model.api_key_env.clone()));
            let analyzer: Arc<dyn ImageAnalyzer> = Arc::<Unconfigured>::clone(&missing);
            let client: ClientHandle = missing;
            Ok((client, analyzer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use shipyard_core::{Error, NullProgress, SessionContext, ToolInvocation};
    use shipyard_tooling::{DispatchOutcome, ToolDispatcher};

    /// Config whose key variables are never set.
    fn keyless_config() -> ShipyardConfig {
        let mut config = ShipyardConfig::default();
        config.search.api_key_env = "SHIPYARD_CLI_TEST_UNSET_SEARCH_KEY".to_owned();
        config.model.api_key_env = "SHIPYARD_CLI_TEST_UNSET_MODEL_KEY".to_owned();
        config
    }

    async fn dispatch_keyless(name: &str, input: Value) -> Result<DispatchOutcome> {
        let config = keyless_config();
        let wiring = wire(&config).unwrap();
        let dispatcher = ToolDispatcher::new(wiring.backends, &config.dispatch);
        let session = SessionContext::new("bakery", Arc::new(NullProgress), wiring.client);

        dispatcher
            .dispatch(&ToolInvocation::new("t1", name, input), &session)
            .await
    }

    #[tokio::test]
    async fn deploy_runs_without_api_keys() {
        let results = dispatch_keyless("deploy_project_tool", json!({}))
            .await
            .unwrap()
            .into_results();

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].text(),
            "Your project has been deployed on the link: https://shipstation.ai/bakery"
        );
    }

    #[tokio::test]
    async fn unknown_tool_runs_without_api_keys() {
        let outcome = dispatch_keyless("nope_tool", json!({})).await.unwrap();

        assert!(outcome.into_results().is_empty());
    }

    #[tokio::test]
    async fn keyed_tool_names_missing_key() {
        let err = dispatch_keyless("search_tool", json!({"query": "croissants"}))
            .await
            .unwrap_err();

        match err {
            Error::Config(message) => {
                assert!(message.contains("SHIPYARD_CLI_TEST_UNSET_SEARCH_KEY"), "{message}");
            }
            other => panic!("expected a configuration error, got {other}"),
        }
    }
}
