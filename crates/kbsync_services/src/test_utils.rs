use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use kbsync_domain::{
    CollectionStats, Infrastructure, Outcome, RecordParseError, Reporter, RunTally, StoredPoint,
    TransferResult, VectorStore, VectorStoreError,
};
use kbsync_infra::{FileRowSource, HttpGraphqlClient, KbFileService};
use url::Url;

/// Real file and HTTP services against a mock endpoint, with an in-memory
/// vector store.
pub struct TestInfra {
    row_source: FileRowSource,
    graphql_client: HttpGraphqlClient,
    vector_store: FakeVectorStore,
    file_service: KbFileService,
}

impl TestInfra {
    pub fn new(server: &mockito::ServerGuard) -> Self {
        Self::with_endpoint(Url::parse(&format!("{}/api/graphql", server.url())).unwrap())
    }

    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            row_source: FileRowSource::new(),
            graphql_client: HttpGraphqlClient::new(endpoint, Duration::from_secs(2)).unwrap(),
            vector_store: FakeVectorStore::default(),
            file_service: KbFileService::new(),
        }
    }

    pub fn points(mut self, collection: &str, points: Vec<StoredPoint>) -> Self {
        self.vector_store.collections.insert(collection.to_string(), points);
        self
    }

    pub fn vector_store_down(mut self) -> Self {
        self.vector_store.down = true;
        self
    }
}

impl Infrastructure for TestInfra {
    type RowSource = FileRowSource;
    type GraphqlService = HttpGraphqlClient;
    type HealthService = HttpGraphqlClient;
    type VectorStore = FakeVectorStore;
    type FileService = KbFileService;

    fn row_source(&self) -> &Self::RowSource {
        &self.row_source
    }

    fn graphql_service(&self) -> &Self::GraphqlService {
        &self.graphql_client
    }

    fn health_service(&self) -> &Self::HealthService {
        &self.graphql_client
    }

    fn vector_store(&self) -> &Self::VectorStore {
        &self.vector_store
    }

    fn file_service(&self) -> &Self::FileService {
        &self.file_service
    }
}

#[derive(Default)]
pub struct FakeVectorStore {
    collections: BTreeMap<String, Vec<StoredPoint>>,
    down: bool,
}

#[async_trait::async_trait]
impl VectorStore for FakeVectorStore {
    async fn scroll(&self, collection: &str) -> Result<Vec<StoredPoint>, VectorStoreError> {
        if self.down {
            return Err(VectorStoreError::Connection("connection refused".to_string()));
        }
        self.collections
            .get(collection)
            .cloned()
            .ok_or_else(|| VectorStoreError::Request(format!("Collection `{collection}` doesn't exist!")))
    }

    async fn collections(&self) -> Result<Vec<CollectionStats>, VectorStoreError> {
        if self.down {
            return Err(VectorStoreError::Connection("connection refused".to_string()));
        }
        Ok(self
            .collections
            .iter()
            .map(|(name, points)| CollectionStats { name: name.clone(), points: points.len() as u64 })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Dispatched(usize, Outcome),
    Skipped(usize),
    Finished(usize, usize, usize),
}

/// Keeps every reporter callback for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
    details: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn details(&self) -> Vec<String> {
        self.details.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn started(&self, kind: &str, _path: &Path) {
        self.events.lock().unwrap().push(Event::Started(kind.to_string()));
    }

    fn dispatched(&self, position: usize, _label: &str, result: &TransferResult) {
        self.events.lock().unwrap().push(Event::Dispatched(position, result.outcome()));
        self.details.lock().unwrap().push(result.detail().to_string());
    }

    fn skipped(&self, error: &RecordParseError) {
        self.events.lock().unwrap().push(Event::Skipped(error.position));
    }

    fn finished(&self, _kind: &str, tally: &RunTally) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Finished(tally.total(), tally.succeeded(), tally.failed()));
    }
}
