//! Error types for AI Commenter

use serde::Serialize;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the commenter pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The upload is missing, empty, or not a decodable image
    #[error("Image encoding failed: {0}")]
    Encoding(String),

    /// Missing or invalid settings (usually the API key)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The model provider answered with an error or an unusable response
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Timeout error
    #[error("Request timeout")]
    Timeout,
}

/// Coarse classification used at the UI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Encoding,
    ModelCall,
    Configuration,
}

impl Error {
    /// Create a new encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Error::Encoding(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new model call error
    pub fn model_call(msg: impl Into<String>) -> Self {
        Error::ModelCall(msg.into())
    }

    /// Create a timeout error
    pub fn timeout() -> Self {
        Error::Timeout
    }

    /// Transport, JSON and timeout failures all come from talking to the
    /// provider, so they classify as model-call errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Config(_) => ErrorKind::Configuration,
            Error::ModelCall(_) | Error::Http(_) | Error::Json(_) | Error::Timeout => {
                ErrorKind::ModelCall
            }
        }
    }

    /// Convert a reqwest failure, keeping timeouts distinguishable.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Http(err)
        }
    }
}
