//! Configuration for dispatch behavior and the backend adapters.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use toml::{from_str, to_string_pretty};
use tracing::debug;

use crate::{Error, Result};

/// Complete Shipyard configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipyardConfig {
    /// Dispatcher behavior
    pub dispatch: DispatchConfig,
    /// Outbound HTTP settings
    pub http: HttpConfig,
    /// Search backend settings
    pub search: SearchConfig,
    /// Model backend settings
    pub model: ModelConfig,
    /// File storage settings
    pub storage: StorageConfig,
}

/// Dispatcher behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Base url deploy links are built from
    pub deploy_base_url: String,
    /// How many image downloads may be in flight at once during a search
    pub image_fetch_concurrency: usize,
    /// Reject task assignment for files this process never created
    pub strict_task_assignment: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            deploy_base_url: "https://shipstation.ai".to_owned(),
            image_fetch_concurrency: 1,
            strict_task_assignment: false,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent sent with image downloads
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("shipyard/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Search backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search API endpoint
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_owned(),
            api_key_env: "TAVILY_API_KEY".to_owned(),
        }
    }
}

/// Model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,
    /// Model name used for code generation and image analysis
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_owned(),
            model: "gpt-4o".to_owned(),
            api_key_env: "SHIPYARD_API_KEY".to_owned(),
        }
    }
}

/// File storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory project folders are created under
    pub root_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("projects"),
        }
    }
}

impl ShipyardConfig {
    /// Get the default config directory path (`~/.shipyard`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".shipyard"))
    }

    /// Get the default config file path (`~/.shipyard/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from `path`, or the default location when `None`.
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read, parsed, or validated
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            debug!("No config at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = from_str(&contents)?;
        config.validate()?;

        debug!(
            "Loaded config from {:?}: concurrency={}, strict={}",
            path, config.dispatch.image_fetch_concurrency, config.dispatch.strict_task_assignment
        );

        Ok(config)
    }

    /// Save config to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize config: {error}")))?;

        let header = "# Shipyard Configuration File\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))?;

        Ok(())
    }

    /// Checks values serde cannot constrain.
    ///
    /// # Errors
    /// Returns [`Error::Config`] describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.image_fetch_concurrency == 0 {
            return Err(Error::Config(
                "dispatch.image_fetch_concurrency must be at least 1".to_owned(),
            ));
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::Config(
                "http.timeout_seconds must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Reads the search API key from its configured environment variable.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the variable is unset
    pub fn search_api_key(&self) -> Result<String> {
        read_key(&self.search.api_key_env)
    }

    /// Reads the model API key from its configured environment variable.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the variable is unset
    pub fn model_api_key(&self) -> Result<String> {
        read_key(&self.model.api_key_env)
    }
}

/// Reads a non-empty environment variable.
fn read_key(var: &str) -> Result<String> {
    env::var(var)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Config(format!("{var} not set")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = ShipyardConfig::default();
        assert_eq!(config.dispatch.deploy_base_url, "https://shipstation.ai");
        assert_eq!(config.dispatch.image_fetch_concurrency, 1);
        assert!(!config.dispatch.strict_task_assignment);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[dispatch]\nimage_fetch_concurrency = 4\n\n[storage]\nroot_path = \"/srv/sites\""
        )
        .unwrap();

        let config = ShipyardConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.dispatch.image_fetch_concurrency, 4);
        assert_eq!(config.dispatch.deploy_base_url, "https://shipstation.ai");
        assert_eq!(config.storage.root_path, PathBuf::from("/srv/sites"));
        assert_eq!(config.http.timeout_seconds, 30);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[dispatch]\nimage_fetch_concurrency = 0").unwrap();

        let err = ShipyardConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config =
            ShipyardConfig::load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.model.api_key_env, "SHIPYARD_API_KEY");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ShipyardConfig::default();
        config.dispatch.strict_task_assignment = true;
        config.save_to_file(&path).unwrap();

        let loaded = ShipyardConfig::load_from_file(&path).unwrap();
        assert!(loaded.dispatch.strict_task_assignment);
    }
}
