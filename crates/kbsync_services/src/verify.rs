use std::sync::Arc;

use kbsync_domain::{
    CollectionStats, GraphqlOperation, HealthService, Infrastructure, VectorStore,
    INSTRUCTIONS_COLLECTION, SQL_PAIRS_COLLECTION,
};
use tracing::{info, warn};
use url::Url;

use crate::export::{query_field, ExportError};

/// A count that may have failed to load. A failed probe counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountProbe {
    pub count: usize,
    pub error: Option<String>,
}

impl CountProbe {
    fn from_result<E: ToString>(source: &str, result: Result<usize, E>) -> Self {
        match result {
            Ok(count) => Self { count, error: None },
            Err(error) => {
                let error = error.to_string();
                warn!(source, error = %error, "Verification probe failed");
                Self { count: 0, error: Some(error) }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub qdrant_instructions: CountProbe,
    pub qdrant_sql_pairs: CountProbe,
    pub api_sql_pairs: CountProbe,
    pub collections: Result<Vec<CollectionStats>, String>,
}

impl VerificationReport {
    /// Data is considered loaded once both instructions and SQL pairs show up.
    pub fn passed(&self) -> bool {
        self.qdrant_instructions.count > 0 && self.api_sql_pairs.count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub url: Url,
    pub status: Result<u16, String>,
}

impl HealthReport {
    /// Any HTTP answer means the service is up.
    pub fn reachable(&self) -> bool {
        self.status.is_ok()
    }
}

/// Read-only checks against the API and the vector store.
pub struct KbVerifier<F> {
    infra: Arc<F>,
}

impl<F: Infrastructure> KbVerifier<F> {
    pub fn new(infra: Arc<F>) -> Self {
        Self { infra }
    }

    pub async fn verify(&self) -> VerificationReport {
        let store = self.infra.vector_store();

        let qdrant_instructions = CountProbe::from_result(
            INSTRUCTIONS_COLLECTION,
            store.scroll(INSTRUCTIONS_COLLECTION).await.map(|points| points.len()),
        );
        let qdrant_sql_pairs = CountProbe::from_result(
            SQL_PAIRS_COLLECTION,
            store.scroll(SQL_PAIRS_COLLECTION).await.map(|points| points.len()),
        );
        let api_sql_pairs = CountProbe::from_result("sqlPairs", self.api_sql_pairs().await);
        let collections = store.collections().await.map_err(|e| e.to_string());

        let report =
            VerificationReport { qdrant_instructions, qdrant_sql_pairs, api_sql_pairs, collections };
        info!(
            instructions = report.qdrant_instructions.count,
            qdrant_sql_pairs = report.qdrant_sql_pairs.count,
            api_sql_pairs = report.api_sql_pairs.count,
            passed = report.passed(),
            "Verification finished"
        );
        report
    }

    async fn api_sql_pairs(&self) -> Result<usize, ExportError> {
        let operation =
            GraphqlOperation::new("SqlPairs", "query SqlPairs { sqlPairs { id question createdAt } }");
        let value = query_field(self.infra.graphql_service(), &operation, "sqlPairs").await?;
        value
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| ExportError::Decode {
                field: "sqlPairs".to_string(),
                reason: "expected a list".to_string(),
            })
    }

    /// Probes the application's base URL.
    pub async fn health(&self, url: &Url) -> HealthReport {
        let status = self
            .infra
            .health_service()
            .probe(url)
            .await
            .map_err(|e| e.to_string());
        HealthReport { url: url.clone(), status }
    }
}

#[cfg(test)]
mod test {
    use kbsync_domain::StoredPoint;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::test_utils::TestInfra;

    async fn api_with_pairs(count: usize) -> (mockito::ServerGuard, mockito::Mock) {
        let pairs: Vec<Value> = (1..=count)
            .map(|id| json!({ "id": id, "question": "q", "createdAt": "2024-05-01" }))
            .collect();
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/graphql")
            .with_status(200)
            .with_body(json!({ "data": { "sqlPairs": pairs } }).to_string())
            .create_async()
            .await;
        (server, mock)
    }

    #[tokio::test]
    async fn test_verify_counts_everything() {
        let (server, _sql_pairs) = api_with_pairs(3).await;
        let infra = TestInfra::new(&server)
            .points(INSTRUCTIONS_COLLECTION, vec![StoredPoint::new("1"), StoredPoint::new("2")])
            .points(SQL_PAIRS_COLLECTION, vec![StoredPoint::new("3")]);

        let actual = KbVerifier::new(Arc::new(infra)).verify().await;

        assert_eq!(actual.qdrant_instructions, CountProbe { count: 2, error: None });
        assert_eq!(actual.qdrant_sql_pairs.count, 1);
        assert_eq!(actual.api_sql_pairs.count, 3);
        assert_eq!(
            actual.collections,
            Ok(vec![
                CollectionStats { name: "instructions".to_string(), points: 2 },
                CollectionStats { name: "sql_pairs".to_string(), points: 1 },
            ])
        );
        assert!(actual.passed());
    }

    #[tokio::test]
    async fn test_probes_fail_independently() {
        let (server, _sql_pairs) = api_with_pairs(1).await;
        let infra = TestInfra::new(&server).vector_store_down();

        let actual = KbVerifier::new(Arc::new(infra)).verify().await;

        assert_eq!(actual.qdrant_instructions.count, 0);
        assert!(actual.qdrant_instructions.error.is_some());
        assert!(actual.collections.is_err());
        assert_eq!(actual.api_sql_pairs, CountProbe { count: 1, error: None });
        assert!(!actual.passed());
    }

    #[tokio::test]
    async fn test_health_reports_any_status_as_reachable() {
        let mut server = mockito::Server::new_async().await;
        let _root = server.mock("GET", "/").with_status(404).create_async().await;
        let verifier = KbVerifier::new(Arc::new(TestInfra::new(&server)));

        let url = Url::parse(&format!("{}/", server.url())).unwrap();
        let actual = verifier.health(&url).await;

        assert_eq!(actual.status, Ok(404));
        assert!(actual.reachable());
    }

    #[tokio::test]
    async fn test_health_unreachable() {
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let verifier = KbVerifier::new(Arc::new(TestInfra::with_endpoint(url.clone())));

        let actual = verifier.health(&url).await;
        assert!(!actual.reachable());
    }
}
