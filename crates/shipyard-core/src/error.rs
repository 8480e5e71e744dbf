use core::result::Result as CoreResult;
use std::io::{Error as IoError, ErrorKind};

use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur while dispatching a tool invocation.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// JSON serialization or deserialization failed.
    ///
    /// Tool arguments that are missing or mistyped surface here.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input could not be used to perform the action.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The addressed resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An external backend reported a failure.
    #[error("{backend} backend failed: {message}")]
    Backend {
        /// Name of the failing backend.
        backend: &'static str,
        /// Failure description.
        message: String,
    },

    /// A tool was invoked out of its expected order.
    #[error("Protocol violation: {0}")]
    Protocol(String),
}

impl Error {
    /// Builds a [`Error::Backend`] for the named backend.
    pub fn backend<T: Into<String>>(backend: &'static str, message: T) -> Self {
        Self::Backend {
            backend,
            message: message.into(),
        }
    }

    /// Whether this error means the addressed resource is absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(err) => err.kind() == ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, from_str};
    use std::io;

    #[test]
    fn test_error_display() {
        let error1 = Error::Config("bad concurrency".to_owned());
        assert_eq!(error1.to_string(), "Configuration error: bad concurrency");

        let error2 = Error::backend("search", "503");
        assert_eq!(error2.to_string(), "search backend failed: 503");

        let error3 = Error::NotFound("site/index.html".to_owned());
        assert_eq!(error3.to_string(), "Not found: site/index.html");
    }

    #[test]
    fn test_error_is_not_found() {
        assert!(Error::NotFound("x".to_owned()).is_not_found());

        let io_error: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(io_error.is_not_found());

        let denied: Error = io::Error::new(io::ErrorKind::PermissionDenied, "no").into();
        assert!(!denied.is_not_found());
        assert!(!Error::Protocol("skipped".to_owned()).is_not_found());
    }

    #[test]
    fn test_error_from_json() {
        let json_error = from_str::<JsonValue>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
