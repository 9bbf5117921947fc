use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems detected before the first dispatch. A run that hits one of
/// these never sends a request.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("Missing required columns in {}: {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("Invalid throttle schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Failed to build client: {0}")]
    Client(String),
}

/// A single input row that could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Row {position}: {reason}")]
pub struct RecordParseError {
    pub position: usize,
    pub reason: String,
}

impl RecordParseError {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self { position, reason: reason.into() }
    }
}

/// Failure of one outbound GraphQL call before a usable envelope came back.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP Error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Timeout, refused connection, TLS failure and the like.
    #[error("Request Error: {0}")]
    Request(String),

    /// A 2xx answer whose body was not a GraphQL envelope.
    #[error("Parse Error: {0}")]
    Parse(String),
}

/// Errors raised by the read-only vector store probes.
#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Qdrant connection error: {0}")]
    Connection(String),

    #[error("Qdrant request failed: {0}")]
    Request(String),
}
