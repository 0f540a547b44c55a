//! Error types for sfauth.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

use crate::auth::credentials::CredentialKey;

/// Primary error type for all authentication and cache operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider answered with an error-shaped body.
    #[error("Authentication failed: {code}: {description}")]
    Authentication { code: String, description: String },

    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("No {0} stored")]
    Missing(&'static str),

    #[error("Missing credential: {0}")]
    MissingCredential(CredentialKey),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Create a provider authentication error.
    pub fn authentication(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Authentication {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Http { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::Transport(_) => ErrorCategory::Network,
            Self::Storage(_) | Self::Missing(_) => ErrorCategory::Storage,
            Self::MissingCredential(_) | Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// The library itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::RetryLater
            }
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Storage => RecoverySuggestion::CheckStorage,
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AuthError>;
