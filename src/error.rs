//! Error types for the travel agent orchestrator

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestrationError {

    // =============================
    // Adapter & Orchestrator Errors
    // =============================

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Dependency failed: {0}")]
    Dependency(String),

    #[error("Internal error: {0}")]
    Internal(String),

    // =============================
    // Wiring Errors
    // =============================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),
}

/// Serializable tag for an [`OrchestrationError`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidParameter,
    Upstream,
    MissingField,
    Dependency,
    Internal,
    Config,
    ToolNotFound,
    InvalidToolInput,
}

impl OrchestrationError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::Dependency(_) => ErrorKind::Dependency,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Config(_) => ErrorKind::Config,
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::InvalidToolInput(_) => ErrorKind::InvalidToolInput,
        }
    }
}

// =============================
// External Library Conversions
// =============================

impl From<reqwest::Error> for OrchestrationError {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else if e.is_decode() {
            format!("malformed response body: {}", e)
        } else {
            format!("request failed: {}", e)
        };
        Self::Upstream { status, message }
    }
}

impl From<serde_json::Error> for OrchestrationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Upstream {
            status: None,
            message: format!("malformed response body: {}", e),
        }
    }
}
