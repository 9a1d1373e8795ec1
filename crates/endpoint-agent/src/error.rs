//! Error types for endpoint-agent

use openapi_parser::{ParseError, ResolveError};
use thiserror::Error;

/// Result type alias for agent operations
pub type AgentResult<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Endpoint {0} not found in openapi spec")]
    EndpointNotFound(String),

    #[error("Missing value for path parameter: {0}")]
    MissingPathParameter(String),

    #[error("No API key configured - set OPENAI_API_KEY or apiKey in settings")]
    MissingApiKey,

    #[error("Model request failed: {0}")]
    ModelError(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Settings error: {0}")]
    SettingsError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
