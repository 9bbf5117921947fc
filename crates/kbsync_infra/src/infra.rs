use kbsync_domain::{ConfigurationError, Environment, Infrastructure};

use crate::fs::KbFileService;
use crate::graphql::HttpGraphqlClient;
use crate::qdrant::QdrantVectorStore;
use crate::row_source::FileRowSource;

pub struct KbInfra {
    row_source: FileRowSource,
    graphql_client: HttpGraphqlClient,
    vector_store: QdrantVectorStore,
    file_service: KbFileService,
}

impl KbInfra {
    pub fn new(env: &Environment) -> Result<Self, ConfigurationError> {
        Ok(Self {
            row_source: FileRowSource::new(),
            graphql_client: HttpGraphqlClient::new(env.graphql_endpoint.clone(), env.timeout)?,
            vector_store: QdrantVectorStore::new(&env.qdrant_url, env.timeout)?,
            file_service: KbFileService::new(),
        })
    }
}

impl Infrastructure for KbInfra {
    type RowSource = FileRowSource;
    type GraphqlService = HttpGraphqlClient;
    type HealthService = HttpGraphqlClient;
    type VectorStore = QdrantVectorStore;
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

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;

    #[tokio::test]
    async fn test_builds_from_environment() {
        let env = Environment::new(Url::parse("http://localhost:3000/api/graphql").unwrap());
        let infra = KbInfra::new(&env).unwrap();
        assert_eq!(infra.graphql_service().endpoint().as_str(), "http://localhost:3000/api/graphql");
    }
}
