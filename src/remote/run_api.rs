// cloudrun-logs - remote/run_api.rs
//
// Cloud Run Admin API (v1, Knative-shaped) service listing.

use crate::core::model::{RawCondition, RawService};
use crate::remote::auth::TokenProvider;
use crate::remote::{send_json, ServiceSource};
use crate::util::error::RemoteError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// HTTP implementation of [`ServiceSource`].
#[derive(Debug, Clone)]
pub struct CloudRunClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenProvider,
}

impl CloudRunClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, tokens: TokenProvider) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            tokens,
        }
    }

    fn services_url(&self, project_id: &str, region: &str) -> String {
        format!(
            "{}/v1/projects/{project_id}/locations/{region}/services",
            self.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ServiceSource for CloudRunClient {
    async fn list_services(
        &self,
        project_id: &str,
        region: &str,
    ) -> Result<Vec<RawService>, RemoteError> {
        let token = self.tokens.access_token().await?;
        let url = self.services_url(project_id, region);

        let listing: ListServicesResponse =
            send_json(self.http.get(&url).bearer_auth(&token), &url).await?;

        tracing::debug!(
            items = listing.items.len(),
            unreachable = listing.unreachable.len(),
            "Fetched service listing"
        );

        Ok(listing.items.into_iter().map(RawService::from).collect())
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListServicesResponse {
    items: Vec<WireService>,
    unreachable: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireService {
    metadata: WireMetadata,
    status: WireStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireMetadata {
    name: String,
    annotations: HashMap<String, String>,
    creation_timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireStatus {
    url: String,
    conditions: Vec<WireCondition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
    reason: Option<String>,
    message: Option<String>,
}

impl From<WireService> for RawService {
    fn from(wire: WireService) -> Self {
        RawService {
            name: wire.metadata.name,
            annotations: wire.metadata.annotations,
            creation_timestamp: wire.metadata.creation_timestamp,
            url: wire.status.url,
            conditions: wire
                .status
                .conditions
                .into_iter()
                .map(|c| RawCondition {
                    kind: c.kind,
                    status: c.status,
                    reason: c.reason,
                    message: c.message,
                })
                .collect(),
        }
    }
}
