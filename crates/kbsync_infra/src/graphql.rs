use std::time::Duration;

use kbsync_domain::{
    truncate, ConfigurationError, GraphqlOperation, GraphqlResponse, GraphqlService, HealthService,
    TransportError,
};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Longest body excerpt carried into an error detail.
const BODY_EXCERPT: usize = 500;

/// Timeout of the reachability probe, independent of the transfer timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpGraphqlClient {
    client: Client,
    endpoint: Url,
}

impl HttpGraphqlClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, ConfigurationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::Client(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl GraphqlService for HttpGraphqlClient {
    async fn execute(
        &self,
        operation: &GraphqlOperation,
    ) -> Result<GraphqlResponse, TransportError> {
        debug!(operation = %operation.operation_name, endpoint = %self.endpoint, "Sending GraphQL request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(operation)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(body.trim(), BODY_EXCERPT),
            });
        }

        serde_json::from_str::<GraphqlResponse>(&body).map_err(|e| {
            TransportError::Parse(format!("{}: {}", e, truncate(body.trim(), BODY_EXCERPT)))
        })
    }
}

#[async_trait::async_trait]
impl HealthService for HttpGraphqlClient {
    async fn probe(&self, url: &Url) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}
