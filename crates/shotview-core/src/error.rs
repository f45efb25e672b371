//! Error types for shotview-core.
//!
//! The reducer itself is total and never returns errors. Everything here
//! belongs to the boundary: decoding payloads and events, loading the
//! configuration file, installing the log subscriber, and talking to the
//! persisted key-value store.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// An event line could not be decoded.
    #[error("invalid event: {0}")]
    Event(String),

    /// The initial run payload could not be decoded.
    #[error("invalid run payload: {0}")]
    Payload(String),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(String, String),

    #[error("failed to parse config: {0}")]
    ParseFailed(String),

    #[error("failed to serialize config: {0}")]
    SerializeFailed(String),
}

/// Persisted key-value store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("corrupt store {path}: {reason}")]
    Corrupt { path: String, reason: String },
}
