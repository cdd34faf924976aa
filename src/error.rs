//! Error types for the blockchain demo

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Mining was requested while the pending queue is empty.
    NothingToMine,
    InvalidAmount(String),
    InvalidBlockLinkage {
        index: u64,
        expected: String,
        found: String,
    },
    SessionNotFound(String),
    SessionLimitReached(usize),
    ConfigError(String),
    IoError(String),
    SerializationError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::NothingToMine => write!(
                f,
                "No pending transactions to mine. Add some transactions first."
            ),
            ChainError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            ChainError::InvalidBlockLinkage {
                index,
                expected,
                found,
            } => write!(
                f,
                "Invalid block linkage at block {}: expected {}, found {}",
                index, expected, found
            ),
            ChainError::SessionNotFound(id) => write!(f, "Session not found: {}", id),
            ChainError::SessionLimitReached(limit) => {
                write!(f, "Session limit of {} reached", limit)
            }
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
            ChainError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
