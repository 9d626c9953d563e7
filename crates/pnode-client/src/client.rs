//! Telemetry client facade: one cached query family per endpoint.
//!
//! Every query goes through a [`QueryCache`], so views sharing a query share
//! its data, its staleness and its single in-flight request.

use std::future::Future;
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::info;

use pnode_shared::{
    AlertsResponse, ComparisonResponse, ConsistencyResponse, HealthResponse,
    NetworkAnalyticsResponse, NetworkHealthResponse, NetworkHistoryResponse, Node,
    NodeAlertsResponse, NodesResponse, QueryError, RecommendationsResponse, TransportError,
};

use crate::api::TelemetryApi;
use crate::cache::{fetcher, Fetcher, QueryCache, QueryKey, QueryPolicy, Subscription};
use crate::config::ClientConfig;
use crate::params::{NodeListParams, RecommendationParams};
use crate::transport::{HttpTransport, Transport};
use crate::views::compare::{compare, Comparison, Selection};

/// Key, policy and fetcher of one query instance.
struct Query<T> {
    key: QueryKey,
    policy: QueryPolicy,
    fetcher: Fetcher<T>,
}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    async fn fetch(self, cache: &QueryCache<T>) -> Result<T, QueryError> {
        cache.fetch(self.key, self.policy, self.fetcher).await
    }

    fn subscribe(self, cache: &QueryCache<T>) -> Subscription<T> {
        cache.subscribe(self.key, self.policy, self.fetcher)
    }
}

#[derive(Default)]
struct Caches {
    health: QueryCache<HealthResponse>,
    network_health: QueryCache<NetworkHealthResponse>,
    pnodes: QueryCache<NodesResponse>,
    history: QueryCache<NetworkHistoryResponse>,
    growth: QueryCache<Value>,
    critical_alerts: QueryCache<AlertsResponse>,
    node: QueryCache<Node>,
    node_alerts: QueryCache<NodeAlertsResponse>,
    consistency: QueryCache<ConsistencyResponse>,
    recommendations: QueryCache<RecommendationsResponse>,
    analytics: QueryCache<NetworkAnalyticsResponse>,
    comparison: QueryCache<ComparisonResponse>,
}

/// Cheaply cloneable handle; clones share every cache.
#[derive(Clone)]
pub struct TelemetryClient {
    api: TelemetryApi,
    config: ClientConfig,
    caches: Arc<Caches>,
}

impl TelemetryClient {
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            api: TelemetryApi::new(transport),
            config,
            caches: Arc::new(Caches::default()),
        }
    }

    /// Client over the default HTTP transport at `config.api_url`.
    pub fn http(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.api_url.clone(), config.request_timeout)?;
        info!(url = %config.api_url, "Telemetry client ready");
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api(&self) -> &TelemetryApi {
        &self.api
    }

    fn query<T, F, Fut>(&self, key: QueryKey, policy: QueryPolicy, call: F) -> Query<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(TelemetryApi) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, QueryError>> + Send + 'static,
    {
        let api = self.api.clone();
        Query {
            key,
            policy,
            fetcher: fetcher(move || call(api.clone())),
        }
    }

    // -- network-wide -------------------------------------------------------

    fn health_query(&self) -> Query<HealthResponse> {
        self.query(
            QueryKey::new("health"),
            self.config.standard_policy(),
            |api| async move { api.health().await },
        )
    }

    pub async fn health(&self) -> Result<HealthResponse, QueryError> {
        self.health_query().fetch(&self.caches.health).await
    }

    pub fn subscribe_health(&self) -> Subscription<HealthResponse> {
        self.health_query().subscribe(&self.caches.health)
    }

    fn network_health_query(&self) -> Query<NetworkHealthResponse> {
        self.query(
            QueryKey::new("network-health"),
            self.config.standard_policy(),
            |api| async move { api.network_health().await },
        )
    }

    pub async fn network_health(&self) -> Result<NetworkHealthResponse, QueryError> {
        self.network_health_query()
            .fetch(&self.caches.network_health)
            .await
    }

    pub fn subscribe_network_health(&self) -> Subscription<NetworkHealthResponse> {
        self.network_health_query()
            .subscribe(&self.caches.network_health)
    }

    fn history_query(&self, hours: u32) -> Query<NetworkHistoryResponse> {
        self.query(
            QueryKey::new("network-history").param("hours", hours),
            self.config.standard_policy(),
            move |api| async move { api.network_history(hours).await },
        )
    }

    pub async fn network_history(&self, hours: u32) -> Result<NetworkHistoryResponse, QueryError> {
        self.history_query(hours).fetch(&self.caches.history).await
    }

    pub fn subscribe_network_history(&self, hours: u32) -> Subscription<NetworkHistoryResponse> {
        self.history_query(hours).subscribe(&self.caches.history)
    }

    pub async fn network_growth(&self, hours: u32) -> Result<Value, QueryError> {
        self.query(
            QueryKey::new("network-growth").param("hours", hours),
            self.config.standard_policy(),
            move |api| async move { api.network_growth(hours).await },
        )
        .fetch(&self.caches.growth)
        .await
    }

    fn critical_alerts_query(&self) -> Query<AlertsResponse> {
        self.query(
            QueryKey::new("critical-alerts"),
            self.config.standard_policy(),
            |api| async move { api.critical_alerts().await },
        )
    }

    pub async fn critical_alerts(&self) -> Result<AlertsResponse, QueryError> {
        self.critical_alerts_query()
            .fetch(&self.caches.critical_alerts)
            .await
    }

    pub fn subscribe_critical_alerts(&self) -> Subscription<AlertsResponse> {
        self.critical_alerts_query()
            .subscribe(&self.caches.critical_alerts)
    }

    fn analytics_query(&self) -> Query<NetworkAnalyticsResponse> {
        self.query(
            QueryKey::new("network-analytics"),
            self.config.list_policy(),
            |api| async move { api.network_analytics().await },
        )
    }

    pub async fn network_analytics(&self) -> Result<NetworkAnalyticsResponse, QueryError> {
        self.analytics_query().fetch(&self.caches.analytics).await
    }

    pub fn subscribe_network_analytics(&self) -> Subscription<NetworkAnalyticsResponse> {
        self.analytics_query().subscribe(&self.caches.analytics)
    }

    // -- node collections ---------------------------------------------------

    fn pnodes_query(&self, params: &NodeListParams) -> Query<NodesResponse> {
        let owned = params.clone();
        self.query(params.key(), self.config.list_policy(), move |api| {
            let params = owned.clone();
            async move { api.pnodes(&params).await }
        })
    }

    pub async fn pnodes(&self, params: &NodeListParams) -> Result<NodesResponse, QueryError> {
        self.pnodes_query(params).fetch(&self.caches.pnodes).await
    }

    pub fn subscribe_pnodes(&self, params: &NodeListParams) -> Subscription<NodesResponse> {
        self.pnodes_query(params).subscribe(&self.caches.pnodes)
    }

    fn recommendations_query(&self, params: &RecommendationParams) -> Query<RecommendationsResponse> {
        let owned = params.clone();
        self.query(params.key(), self.config.list_policy(), move |api| {
            let params = owned.clone();
            async move { api.recommendations(&params).await }
        })
    }

    pub async fn recommendations(
        &self,
        params: &RecommendationParams,
    ) -> Result<RecommendationsResponse, QueryError> {
        self.recommendations_query(params)
            .fetch(&self.caches.recommendations)
            .await
    }

    pub fn subscribe_recommendations(
        &self,
        params: &RecommendationParams,
    ) -> Subscription<RecommendationsResponse> {
        self.recommendations_query(params)
            .subscribe(&self.caches.recommendations)
    }

    /// Server-side comparison of the selected addresses.
    pub async fn comparison(&self, addresses: &[String]) -> Result<ComparisonResponse, QueryError> {
        let owned = addresses.to_vec();
        self.query(
            QueryKey::new("compare").param("addresses", addresses.join(",")),
            self.config.list_policy(),
            move |api| {
                let addresses = owned.clone();
                async move { api.compare(&addresses).await }
            },
        )
        .fetch(&self.caches.comparison)
        .await
    }

    /// Compare the selection locally from each node's registry entry.
    pub async fn compare_selection(&self, selection: &Selection) -> Result<Comparison, QueryError> {
        if !selection.is_comparable() {
            return Err(QueryError::Invalid(format!(
                "select at least 2 nodes to compare, got {}",
                selection.len()
            )));
        }

        let nodes = try_join_all(selection.addresses().iter().map(|a| self.node(a))).await?;
        compare(&nodes).ok_or_else(|| QueryError::Invalid("selection out of range".into()))
    }

    // -- single node --------------------------------------------------------

    fn node_query(&self, address: &str) -> Query<Node> {
        let owned = address.trim().to_string();
        self.query(
            node_key("node", address),
            self.config.node_policy(),
            move |api| {
                let address = owned.clone();
                async move { api.registry_entry(&address).await }
            },
        )
    }

    pub async fn node(&self, address: &str) -> Result<Node, QueryError> {
        self.node_query(address).fetch(&self.caches.node).await
    }

    pub fn subscribe_node(&self, address: &str) -> Subscription<Node> {
        self.node_query(address).subscribe(&self.caches.node)
    }

    fn node_alerts_query(&self, address: &str) -> Query<NodeAlertsResponse> {
        let owned = address.trim().to_string();
        self.query(
            node_key("node-alerts", address),
            self.config.node_policy(),
            move |api| {
                let address = owned.clone();
                async move { api.node_alerts(&address).await }
            },
        )
    }

    pub async fn node_alerts(&self, address: &str) -> Result<NodeAlertsResponse, QueryError> {
        self.node_alerts_query(address)
            .fetch(&self.caches.node_alerts)
            .await
    }

    pub fn subscribe_node_alerts(&self, address: &str) -> Subscription<NodeAlertsResponse> {
        self.node_alerts_query(address)
            .subscribe(&self.caches.node_alerts)
    }

    fn consistency_query(&self, address: &str) -> Query<ConsistencyResponse> {
        let owned = address.trim().to_string();
        self.query(
            node_key("node-consistency", address),
            self.config.node_policy(),
            move |api| {
                let address = owned.clone();
                async move { api.node_consistency(&address).await }
            },
        )
    }

    pub async fn node_consistency(&self, address: &str) -> Result<ConsistencyResponse, QueryError> {
        self.consistency_query(address)
            .fetch(&self.caches.consistency)
            .await
    }

    pub fn subscribe_node_consistency(&self, address: &str) -> Subscription<ConsistencyResponse> {
        self.consistency_query(address)
            .subscribe(&self.caches.consistency)
    }

    /// Mark every cached query about `address` stale.
    pub fn invalidate_node(&self, address: &str) {
        self.caches
            .node
            .invalidate(&node_key("node", address));
        self.caches
            .node_alerts
            .invalidate(&node_key("node-alerts", address));
        self.caches
            .consistency
            .invalidate(&node_key("node-consistency", address));
    }
}

/// Per-node queries are keyed on the address as it is sent on the wire.
fn node_key(name: &str, address: &str) -> QueryKey {
    QueryKey::new(name).param("address", address.trim())
}
