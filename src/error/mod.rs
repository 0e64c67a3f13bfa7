//! Error types for the research assistant.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use std::time::Duration;

use thiserror::Error;

/// Primary error type for all orchestrator operations.
#[derive(Error, Debug)]
pub enum ResearchError {
    /// Caller input was rejected before any work started.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Agent configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend or capability could not be constructed.
    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Task timeout after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Tool execution error: {tool_name} - {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Execution failed for a reason not covered above.
    #[error("{0}")]
    Service(String),
}

impl ResearchError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::InvalidArgument(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Initialization(_) => ErrorCategory::Initialization,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::Io(_) | Self::Service(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error stops the process at startup rather than failing one request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Initialization
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Validation => RecoverySuggestion::FixInput,
            ErrorCategory::Authentication | ErrorCategory::Initialization => {
                RecoverySuggestion::CheckCredentials
            }
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::TryAgainLater
            }
            ErrorCategory::Timeout => RecoverySuggestion::NarrowQuery,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckCapability,
            _ => RecoverySuggestion::None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ResearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_mentions_timeout() {
        let err = ResearchError::Timeout(Duration::from_secs(600));
        assert_eq!(err.to_string(), "Task timeout after 600s");
        assert_eq!(err.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn startup_errors_are_fatal() {
        assert!(ResearchError::Config("bad yaml".into()).is_fatal());
        assert!(ResearchError::Initialization("missing key".into()).is_fatal());
        assert!(!ResearchError::tool("site_search", "404").is_fatal());
    }

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(
            ResearchError::api(401, "nope").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            ResearchError::api(503, "down").category(),
            ErrorCategory::Server
        );
        assert_eq!(ResearchError::api(400, "bad").category(), ErrorCategory::Api);
    }
}
