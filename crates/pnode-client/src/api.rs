//! Typed endpoints of the telemetry API.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use pnode_shared::constants::MAX_COMPARE_NODES;
use pnode_shared::{
    AlertsResponse, ComparisonResponse, ConsistencyResponse, HealthResponse,
    NetworkAnalyticsResponse, NetworkHealthResponse, NetworkHistoryResponse, Node,
    NodeAlertsResponse, NodesResponse, QueryError, RecommendationsResponse,
    RegistryEntryResponse, TransportError,
};

use crate::params::{NodeListParams, RecommendationParams};
use crate::transport::Transport;

/// Decodes raw transport payloads into response models.
///
/// A 404 becomes [`QueryError::NotFound`]; other transport failures stay
/// retryable. Payloads that fail to decode surface as [`QueryError::Decode`].
#[derive(Clone)]
pub struct TelemetryApi {
    transport: Arc<dyn Transport>,
}

impl TelemetryApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn health(&self) -> Result<HealthResponse, QueryError> {
        self.get("/health", &[]).await
    }

    pub async fn network_health(&self) -> Result<NetworkHealthResponse, QueryError> {
        self.get("/network/health", &[]).await
    }

    pub async fn pnodes(&self, params: &NodeListParams) -> Result<NodesResponse, QueryError> {
        self.get("/pnodes", &params.query()).await
    }

    pub async fn network_history(&self, hours: u32) -> Result<NetworkHistoryResponse, QueryError> {
        self.get("/network/history", &[("hours".into(), hours.to_string())])
            .await
    }

    /// Growth report, passed through undecoded.
    pub async fn network_growth(&self, hours: u32) -> Result<Value, QueryError> {
        self.get("/network/growth", &[("hours".into(), hours.to_string())])
            .await
    }

    pub async fn critical_alerts(&self) -> Result<AlertsResponse, QueryError> {
        self.get("/alerts/critical", &[]).await
    }

    pub async fn node_alerts(&self, address: &str) -> Result<NodeAlertsResponse, QueryError> {
        let address = require_address(address)?;
        self.get(&format!("/pnodes/{address}/alerts"), &[]).await
    }

    /// Registry entry for one node. An empty entry is reported as not found.
    pub async fn registry_entry(&self, address: &str) -> Result<Node, QueryError> {
        let address = require_address(address)?;
        let response: RegistryEntryResponse =
            self.get(&format!("/registry/{address}"), &[]).await?;
        response
            .entry
            .ok_or_else(|| QueryError::NotFound(format!("registry entry for {address}")))
    }

    pub async fn node_consistency(&self, address: &str) -> Result<ConsistencyResponse, QueryError> {
        let address = require_address(address)?;
        self.get(&format!("/node/{address}/consistency"), &[]).await
    }

    pub async fn recommendations(
        &self,
        params: &RecommendationParams,
    ) -> Result<RecommendationsResponse, QueryError> {
        self.get("/recommendations", &params.query()).await
    }

    pub async fn network_analytics(&self) -> Result<NetworkAnalyticsResponse, QueryError> {
        self.get("/network/analytics", &[]).await
    }

    /// Server-side comparison of 2 to 5 nodes.
    pub async fn compare(&self, addresses: &[String]) -> Result<ComparisonResponse, QueryError> {
        if !(2..=MAX_COMPARE_NODES).contains(&addresses.len()) {
            return Err(QueryError::Invalid(format!(
                "compare needs 2 to {MAX_COMPARE_NODES} addresses, got {}",
                addresses.len()
            )));
        }
        self.get("/pnodes/compare", &[("addresses".into(), addresses.join(","))])
            .await
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<R, QueryError> {
        let payload = self
            .transport
            .get(path, params)
            .await
            .map_err(|e| not_found_or_transport(path, e))?;

        serde_json::from_value(payload).map_err(|e| {
            debug!(path, error = %e, "Response did not match expected shape");
            QueryError::Decode(format!("{path}: {e}"))
        })
    }
}

fn not_found_or_transport(path: &str, e: TransportError) -> QueryError {
    match e.status() {
        Some(404) => QueryError::NotFound(path.to_string()),
        _ => QueryError::Transport(e),
    }
}

fn require_address(address: &str) -> Result<&str, QueryError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(QueryError::Invalid("node address is empty".into()));
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::testing::{status_error, unreachable, MockTransport};

    fn api(mock: &MockTransport) -> TelemetryApi {
        TelemetryApi::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_node_list_sends_params() {
        let mock = MockTransport::fixed(json!({ "pnodes": [], "pagination": { "total": 0 } }));
        let params = NodeListParams {
            skip: 40,
            ..Default::default()
        };

        let response = api(&mock).pnodes(&params).await.unwrap();
        assert!(response.pnodes.is_empty());

        let call = &mock.calls()[0];
        assert_eq!(call.path, "/pnodes");
        assert_eq!(call.param("status"), Some("online"));
        assert_eq!(call.param("skip"), Some("40"));
        assert_eq!(call.param("sort_by"), Some("score"));
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let mock = MockTransport::new(|_, _, _| Err(status_error(404)));
        let err = api(&mock).node_alerts("10.0.0.1:9001").await.unwrap_err();
        assert_eq!(err, QueryError::NotFound("/pnodes/10.0.0.1:9001/alerts".into()));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_stays_retryable() {
        let mock = MockTransport::new(|_, _, _| Err(status_error(503)));
        assert!(api(&mock).health().await.unwrap_err().is_retryable());

        let mock = MockTransport::new(|_, _, _| Err(unreachable()));
        assert!(api(&mock).network_health().await.unwrap_err().is_retryable());
    }

    #[tokio::test]
    async fn test_missing_registry_entry() {
        let mock = MockTransport::fixed(json!({ "entry": null, "last_updated": 1700000000 }));
        let err = api(&mock).registry_entry("abc").await.unwrap_err();
        assert!(matches!(err, QueryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_registry_entry_decodes_node() {
        let mock = MockTransport::fixed(json!({
            "entry": { "address": "abc", "score": 81.0, "tier": "elite", "is_online": true },
            "last_updated": 1700000000
        }));
        let node = api(&mock).registry_entry("abc").await.unwrap();
        assert_eq!(node.address, "abc");
        assert_eq!(mock.calls()[0].path, "/registry/abc");
    }

    #[tokio::test]
    async fn test_empty_address_rejected_without_request() {
        let mock = MockTransport::fixed(json!({}));
        let err = api(&mock).node_consistency("  ").await.unwrap_err();
        assert!(matches!(err, QueryError::Invalid(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let mock = MockTransport::fixed(json!({ "pnodes": "not a list" }));
        let err = api(&mock).pnodes(&NodeListParams::default()).await.unwrap_err();
        assert!(matches!(err, QueryError::Decode(_)));
    }

    #[tokio::test]
    async fn test_compare_bounds_and_joining() {
        let mock = MockTransport::fixed(json!({ "comparison": [] }));
        let one = vec!["a".to_string()];
        assert!(matches!(
            api(&mock).compare(&one).await,
            Err(QueryError::Invalid(_))
        ));

        let three: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        api(&mock).compare(&three).await.unwrap();
        assert_eq!(mock.calls()[0].param("addresses"), Some("a,b,c"));
    }

    #[tokio::test]
    async fn test_history_and_growth_pass_hours() {
        let mock = MockTransport::fixed(json!({ "history": [], "summary": {} }));
        api(&mock).network_history(168).await.unwrap();
        let growth = api(&mock).network_growth(24).await.unwrap();
        assert_eq!(growth["history"], json!([]));

        let calls = mock.calls();
        assert_eq!(calls[0].param("hours"), Some("168"));
        assert_eq!(calls[1].path, "/network/growth");
    }
}
