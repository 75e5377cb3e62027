use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ResolveError {
    #[error("No sessions available")]
    NoSessionsAvailable,

    #[error("Backend call failed: {0}")]
    BackendCallFailed(String),

    #[error("Credential decode failed: {0}")]
    CredentialDecode(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResolveError {
    /// Wrap a failed backend call, keeping the operation name for the log line.
    pub fn backend(operation: &str, e: impl std::fmt::Display) -> Self {
        ResolveError::BackendCallFailed(format!("{}: {}", operation, e))
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        ResolveError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        ResolveError::CredentialDecode(e.to_string())
    }
}

impl From<std::io::Error> for ResolveError {
    fn from(e: std::io::Error) -> Self {
        ResolveError::Config(e.to_string())
    }
}
