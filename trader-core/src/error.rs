//! Error types for the trading client

use thiserror::Error;

/// Client-wide error type
#[derive(Error, Debug)]
pub enum TraderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Exchange error {code}: {message}")]
    Exchange { code: i64, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl TraderError {
    pub fn config(msg: impl Into<String>) -> Self {
        TraderError::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TraderError::InvalidInput(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        TraderError::Network(msg.into())
    }

    pub fn exchange(code: i64, message: impl Into<String>) -> Self {
        TraderError::Exchange {
            code,
            message: message.into(),
        }
    }

    pub fn api(msg: impl Into<String>) -> Self {
        TraderError::Api(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        TraderError::Parse(msg.into())
    }

    /// Configuration problems end the process at startup. Everything else is
    /// scoped to the command that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TraderError::Config(_))
    }
}

/// Result type alias for trading operations
pub type TraderResult<T> = Result<T, TraderError>;
