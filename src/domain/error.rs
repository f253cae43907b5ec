use serde::{Deserialize, Serialize};
use std::fmt;

/// Fatal errors surfaced by the exchange engine.
///
/// Row-level problems never appear here; they are collected as
/// [`RowError`](crate::domain::RowError) entries on the parse result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeError {
    /// The whole file cannot be read: unterminated quote, undecodable bytes, no header.
    MalformedInput(String),
    /// Two internal keys share a display label (or a key is declared twice).
    MappingAmbiguity(String),
    ConfigError(String),
    IoError(String),
    SerializationError(String),
    Timeout(String),
    Internal(String),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            ExchangeError::MappingAmbiguity(msg) => write!(f, "Mapping ambiguity: {}", msg),
            ExchangeError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            ExchangeError::IoError(msg) => write!(f, "IO error: {}", msg),
            ExchangeError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            ExchangeError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ExchangeError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ExchangeError {}

impl From<std::io::Error> for ExchangeError {
    fn from(err: std::io::Error) -> Self {
        ExchangeError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
