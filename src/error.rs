use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Marketplace API errors.
///
/// `Authentication` is kept apart from the other variants so the poll loop
/// can stop on it instead of retrying.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("request failed: {0}")]
    Transient(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("posting {0} not found")]
    NotFound(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Durable state write failures (ledger, credentials).
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Whether an error should stop the process or only the current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Requires operator intervention.
    Fatal,
    /// Logged; the next cycle proceeds.
    Recoverable,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Classify this error for the poll loop.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Error::Config(_) | Error::Api(ApiError::Authentication(_)) => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

pub type Result<T> = std::result::Result<T, Error>;
