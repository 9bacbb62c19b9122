//! Core error types for habitquest-core.
//!
//! Each concern gets its own thiserror enum; [`CoreError`] aggregates the
//! ones that can fail while opening a client.

use std::path::PathBuf;
use thiserror::Error;

use crate::clock::SessionPhase;
use crate::model::EntityKind;

/// Failures while wiring up a client: config, credentials, cache, backend.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Backend transport/protocol errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Local, synchronous errors from driving the focus clock in the wrong order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Invalid session config for '{field}': {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("Cannot {action} while session is {from:?}")]
    InvalidTransition {
        from: SessionPhase,
        action: &'static str,
    },
}

/// Errors surfaced by the optimistic completion reconciler.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Backend rejected the completion or the network failed. Local state
    /// has already been rolled back when this is returned.
    #[error("Could not complete {kind} {id}: {source}")]
    CompletionFailed {
        kind: EntityKind,
        id: i64,
        #[source]
        source: BackendError,
    },

    /// A completion for the same entity is still awaiting confirmation.
    #[error("Completion of {kind} {id} is already in progress")]
    AlreadyInProgress { kind: EntityKind, id: i64 },

    /// The entity was removed locally while its request was in flight.
    /// Callers discard this silently.
    #[error("{kind} {id} was removed before its response arrived")]
    StaleEntity { kind: EntityKind, id: i64 },

    /// The entity is not in the local cache at all.
    #[error("Unknown {kind} {id}")]
    UnknownEntity { kind: EntityKind, id: i64 },
}

/// Errors talking to the REST backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored value could not be decoded
    #[error("Corrupt value under key '{key}': {message}")]
    CorruptValue { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Could not resolve the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// OS keyring failure
    #[error("Credential store error: {0}")]
    Credentials(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        ConfigError::Credentials(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
