//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use whois_bi_client::ClientError;

/// Core layer error type
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Input rejected before any request was sent (e.g. password confirmation mismatch)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Domain name is not known to the store
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Client error (converting from library)
    #[error("{0}")]
    Client(#[from] ClientError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, server refusal, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError(_) | Self::DomainNotFound(_) => true,
            Self::Client(e) => e.is_expected(),
            Self::ConfigError(_) => false,
        }
    }

    /// The message a form would show inline.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message().to_string(),
            Self::ValidationError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
