use std::time::Duration;

use derive_setters::Setters;
use serde::Serialize;
use url::Url;

use crate::{ThrottleSchedule, TransferConfig, DEFAULT_TIMEOUT};

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

#[derive(Debug, Clone, Serialize, Setters)]
#[serde(rename_all = "camelCase")]
#[setters(into)]
/// Represents the services the tool talks to.
pub struct Environment {
    /// The application's GraphQL endpoint.
    pub graphql_endpoint: Url,
    /// The Qdrant gRPC endpoint, used for read-only probes.
    pub qdrant_url: String,
    /// Per-call timeout shared by every client.
    pub timeout: Duration,
}

impl Environment {
    pub fn new(graphql_endpoint: Url) -> Self {
        Self {
            graphql_endpoint,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Base URL of the web application, i.e. the endpoint without its path.
    pub fn app_url(&self) -> Url {
        let mut url = self.graphql_endpoint.clone();
        url.set_path("/");
        url.set_query(None);
        url
    }

    pub fn transfer_config(&self, throttle: ThrottleSchedule) -> TransferConfig {
        TransferConfig::default()
            .endpoint(self.graphql_endpoint.clone())
            .timeout(self.timeout)
            .throttle(throttle)
    }
}
