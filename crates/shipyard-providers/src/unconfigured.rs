use async_trait::async_trait;
use shipyard_core::{Error, ImageAnalyzer, ModelClient, Result, SearchBackend, SearchResults};
use tracing::warn;

/// Stand-in for a backend whose API key is not set.
///
/// Construction always succeeds so tools that never reach this backend keep
/// working; every call fails with [`Error::Config`] naming the missing key.
#[derive(Debug, Clone)]
pub struct Unconfigured {
    /// Backend label used in errors.
    backend: &'static str,
    /// Environment variable that would configure it.
    key_env: String,
}

impl Unconfigured {
    /// Stand-in for `backend`, configured through `key_env`.
    #[must_use]
    pub fn new(backend: &'static str, key_env: impl Into<String>) -> Self {
        Self {
            backend,
            key_env: key_env.into(),
        }
    }

    /// The error every call returns.
    fn error(&self) -> Error {
        warn!("{} backend called without {}", self.backend, self.key_env);
        Error::Config(format!(
            "{} backend requires {} to be set",
            self.backend, self.key_env
        ))
    }
}

#[async_trait]
impl SearchBackend for Unconfigured {
    async fn search(&self, _query: &str) -> Result<SearchResults> {
        Err(self.error())
    }
}

#[async_trait]
impl ImageAnalyzer for Unconfigured {
    async fn analyze(&self, _urls: &[String], _prompt: &str) -> Result<String> {
        Err(self.error())
    }
}

#[async_trait]
impl ModelClient for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_names_the_missing_key() {
        let search = Unconfigured::new("search", "TAVILY_API_KEY");

        let err = search.search("bakery").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: search backend requires TAVILY_API_KEY to be set"
        );

        let model = Unconfigured::new("model", "SHIPYARD_API_KEY");
        assert!(matches!(
            model.complete("system", "prompt").await,
            Err(Error::Config(_))
        ));
        assert!(matches!(
            model.analyze(&[], "prompt").await,
            Err(Error::Config(_))
        ));
    }
}
