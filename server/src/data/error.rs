//! Unified error type for the document store layer

use thiserror::Error;

/// Error returned by document store backends.
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error (file-backed stores)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded for the backend
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend not available
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_unavailable_error_display() {
        let err = DataError::backend_unavailable("memory", "store closed");
        assert_eq!(
            err.to_string(),
            "Backend memory is not available: store closed"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = DataError::Config("collection name must not be empty".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: collection name must not be empty"
        );
    }
}
