//! Error types for the Ramorie agent tool server
//!
//! Uses thiserror for structured error definitions and anyhow for ad-hoc
//! propagation at the CLI edge. Every variant here is a *tool-level* failure:
//! the MCP server renders it into an `isError: true` result rather than a
//! JSON-RPC error (see [`crate::mcp::protocol`] for the protocol-level errors).

use thiserror::Error;

/// Main error type for Ramorie operations
#[derive(Error, Debug)]
pub enum RamorieError {
    /// The remote backend answered with an error status.
    /// The message is the backend's own text, kept verbatim for the agent.
    #[error("{0}")]
    Api(String),

    /// HTTP transport failure (connect, timeout, TLS)
    #[error("failed to make request: {0}")]
    Http(#[from] reqwest::Error),

    /// A required or malformed tool argument
    #[error("{0}")]
    Validation(String),

    /// Entity lookup failed locally (e.g. project name did not match)
    #[error("{0} not found")]
    NotFound(String),

    /// No project supplied and none is active locally or remotely
    #[error("no active project - use set_active_project first")]
    NoActiveProject,

    /// Tool name is not in the catalog
    #[error("tool not implemented: {0}")]
    ToolNotImplemented(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Report rendering failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl RamorieError {
    /// Shorthand for the "`<arg>` is required" validation failure
    pub fn missing_argument(name: &str) -> Self {
        RamorieError::Validation(format!("{} is required", name))
    }
}

/// Result type alias for Ramorie operations
pub type Result<T> = std::result::Result<T, RamorieError>;

/// Convert anyhow::Error to RamorieError
impl From<anyhow::Error> for RamorieError {
    fn from(err: anyhow::Error) -> Self {
        // Alternate form keeps the whole context chain
        RamorieError::Other(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RamorieError::NotFound("project".to_string());
        assert_eq!(err.to_string(), "project not found");
    }

    #[test]
    fn test_missing_argument_message() {
        let err = RamorieError::missing_argument("description");
        assert_eq!(err.to_string(), "description is required");
    }

    #[test]
    fn test_api_message_is_verbatim() {
        let body = "API request failed with status 401: {\"error\":\"unauthorized\"}";
        let err = RamorieError::Api(body.to_string());
        assert_eq!(err.to_string(), body);
    }

    #[test]
    fn test_anyhow_context_chain_is_kept() {
        use anyhow::Context;

        let io: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err: RamorieError = io.context("Failed to read config").unwrap_err().into();
        assert!(matches!(err, RamorieError::Other(_)));
        assert_eq!(err.to_string(), "Failed to read config: no such file");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json");
        assert!(json_err.is_err());

        let err: RamorieError = json_err.unwrap_err().into();
        assert!(matches!(err, RamorieError::Serialization(_)));
    }
}
