//! Error types for agentdeck.

use thiserror::Error;

/// Primary error type for sessions, runners, agents and providers.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session already exists: {0}")]
    SessionExists(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Agent '{agent}' failed: {message}")]
    Handler { agent: String, message: String },
}

/// Broad error category used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Session,
    ToolExecution,
    Unknown,
}

impl AgentError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a handler failure attributed to an agent.
    pub fn handler(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            agent: agent.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::InvalidResponse(_) => ErrorCategory::Serialization,
            Self::SessionNotFound(_) | Self::SessionExists(_) => ErrorCategory::Session,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(AgentError::api(401, "no").category(), ErrorCategory::Authentication);
        assert_eq!(AgentError::api(429, "slow").category(), ErrorCategory::RateLimit);
        assert_eq!(AgentError::api(503, "down").category(), ErrorCategory::Server);
        assert_eq!(AgentError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn session_errors_are_not_retryable() {
        let err = AgentError::SessionNotFound("abc".into());
        assert_eq!(err.category(), ErrorCategory::Session);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Session not found: abc");
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(AgentError::Timeout(100).is_retryable());
        assert!(AgentError::RateLimited { retry_after_ms: None }.is_retryable());
        assert!(AgentError::api(500, "boom").is_retryable());
        assert!(!AgentError::handler("qna", "boom").is_retryable());
    }
}
