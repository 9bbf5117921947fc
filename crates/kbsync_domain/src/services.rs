use std::path::Path;

use url::Url;

use crate::{
    CollectionStats, ConfigurationError, GraphqlOperation, GraphqlResponse, RecordParseError, Row,
    RunTally, StoredPoint, TransferResult, TransportError, VectorStoreError,
};

/// Lazily produced rows of one input file.
pub type Rows = Box<dyn Iterator<Item = Result<Row, RecordParseError>> + Send>;

pub trait RowSource: Send + Sync {
    /// Opens `path` and checks that every `required` column is present. Rows
    /// are produced on demand; a broken row does not end the sequence.
    fn open(&self, path: &Path, required: &[&str]) -> Result<Rows, ConfigurationError>;
}

#[async_trait::async_trait]
pub trait GraphqlService: Send + Sync {
    /// Sends exactly one request for `operation`.
    async fn execute(&self, operation: &GraphqlOperation)
        -> Result<GraphqlResponse, TransportError>;
}

#[async_trait::async_trait]
pub trait HealthService: Send + Sync {
    /// Returns the HTTP status of a plain GET against `url`.
    async fn probe(&self, url: &Url) -> Result<u16, TransportError>;
}

#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Reads every point of `collection` with its payload.
    async fn scroll(&self, collection: &str) -> Result<Vec<StoredPoint>, VectorStoreError>;

    async fn collections(&self) -> Result<Vec<CollectionStats>, VectorStoreError>;
}

/// A header row plus data rows, all as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self { headers: headers.iter().map(|h| h.to_string()).collect(), rows: Vec::new() }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait::async_trait]
pub trait FileService: Send + Sync {
    async fn write_table(&self, path: &Path, table: &Table) -> anyhow::Result<()>;
    async fn write(&self, path: &Path, contents: &[u8]) -> anyhow::Result<()>;
    async fn create_dirs_all(&self, path: &Path) -> anyhow::Result<()>;
}

/// Receives per-row diagnostics as soon as they happen.
pub trait Reporter: Send + Sync {
    fn started(&self, kind: &str, path: &Path);
    fn dispatched(&self, position: usize, label: &str, result: &TransferResult);
    fn skipped(&self, error: &RecordParseError);
    fn finished(&self, kind: &str, tally: &RunTally);
}

/// Everything the services need from the outside world.
pub trait Infrastructure: Send + Sync + 'static {
    type RowSource: RowSource;
    type GraphqlService: GraphqlService;
    type HealthService: HealthService;
    type VectorStore: VectorStore;
    type FileService: FileService;

    fn row_source(&self) -> &Self::RowSource;
    fn graphql_service(&self) -> &Self::GraphqlService;
    fn health_service(&self) -> &Self::HealthService;
    fn vector_store(&self) -> &Self::VectorStore;
    fn file_service(&self) -> &Self::FileService;
}
