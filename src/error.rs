//! Internal error types.
//!
//! These cover plumbing failures only. Expected API failure modes (network,
//! auth, validation) are resolved into [`crate::outcome::Outcome`] values by
//! the gateway and never surface as `Err` to callers.

use thiserror::Error;

/// Errors from the secure credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for CredentialError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for CredentialError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for CredentialError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Errors from the network transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Timeout after {0}ms")]
    Timeout(u64),
    #[error("Connection error: {0}")]
    Connect(String),
    #[error("Request cancelled")]
    Cancelled,
}
