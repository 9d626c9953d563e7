//! Entity and response models of the telemetry API.
//!
//! Records are immutable values rebuilt on every fetch. Decoding is lenient:
//! missing or `null` fields fall back to their defaults so one sloppy record
//! does not blank a whole view.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::SECONDS_PER_DAY;
use crate::score::{Breakdown, Score};
use crate::tier::{HealthStatus, Tier, TierInfo};

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One storage network participant. `address` is the primary key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(rename = "pubkey", deserialize_with = "null_as_default")]
    pub public_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_online: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_public: bool,
    /// Unix seconds.
    #[serde(deserialize_with = "lenient_i64")]
    pub last_seen: i64,
    #[serde(rename = "uptime", deserialize_with = "lenient_u64")]
    pub uptime_seconds: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub peer_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub peer_sources: Vec<String>,
    /// Bytes. `storage_used <= storage_committed` is not guaranteed upstream.
    #[serde(deserialize_with = "lenient_u64")]
    pub storage_committed: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub storage_used: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_usage_percent: f64,
    /// Composite score, usually 0-100 but not clamped.
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    pub tier: Tier,
    #[serde(deserialize_with = "null_as_default")]
    pub scores: NodeScores,
}

impl Node {
    pub fn trust(&self) -> f64 {
        self.scores.trust.value()
    }

    pub fn capacity(&self) -> f64 {
        self.scores.capacity.value()
    }

    pub fn uptime_days(&self) -> f64 {
        self.uptime_seconds as f64 / SECONDS_PER_DAY as f64
    }

    pub fn tier_info(&self) -> TierInfo {
        self.tier.info()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeScores {
    #[serde(deserialize_with = "null_as_default")]
    pub trust: Score,
    #[serde(deserialize_with = "null_as_default")]
    pub capacity: Score,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake_confidence: Option<StakeConfidence>,
    #[serde(
        deserialize_with = "crate::score::lenient_breakdown",
        skip_serializing_if = "Option::is_none"
    )]
    pub breakdown: Option<Breakdown>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeConfidence {
    #[serde(deserialize_with = "null_as_default")]
    pub composite_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub rating: String,
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Network snapshots
// ---------------------------------------------------------------------------

/// Point-in-time network aggregate. Series are kept in chronological order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSnapshot {
    #[serde(deserialize_with = "lenient_i64")]
    pub timestamp: i64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub online_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_storage_committed: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub avg_peer_count: f64,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_pnodes: u64,
    #[serde(deserialize_with = "lenient_i64")]
    pub last_gossip_fetch: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub uptime: f64,
}

/// `GET /network/health`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkHealthResponse {
    pub health: NetworkHealth,
    pub summary: NetworkHealthSummary,
    #[serde(deserialize_with = "null_as_default")]
    pub alerts: Vec<NetworkAlert>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkHealth {
    #[serde(deserialize_with = "null_as_default")]
    pub health_score: f64,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkHealthSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub online_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub offline_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_storage: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkAlert {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    pub recommendation: Option<String>,
}

/// `GET /pnodes`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub pnodes: Vec<Node>,
    pub summary: NodesSummary,
    pub network_stats: NetworkStats,
    pub pagination: Pagination,
    pub filters: NodeFiltersEcho,
    #[serde(deserialize_with = "lenient_i64")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub online_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub offline_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub snapshot_age_seconds: u64,
    #[serde(deserialize_with = "lenient_i64")]
    pub last_updated: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStats {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_storage_committed: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_storage_used: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub avg_uptime_hours: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub version_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[serde(deserialize_with = "lenient_u64")]
    pub total: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub returned: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub skip: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeFiltersEcho {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sort_by: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sort_order: String,
}

/// `GET /network/history`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkHistoryResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub history: Vec<NetworkSnapshot>,
    pub summary: HistorySummary,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub data_points: u64,
    pub node_growth: Option<RemoteGrowth>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteGrowth {
    #[serde(deserialize_with = "null_as_default")]
    pub growth: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub growth_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub trend: String,
}

/// `GET /alerts/critical`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub critical_nodes: Vec<CriticalNode>,
    pub summary: AlertSummary,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalNode {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alerts: Vec<NodeAlert>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAlert {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    /// `critical`, `warning` or `info`; kept as text since the set is open.
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    pub recommendation: Option<String>,
}

impl NodeAlert {
    pub fn is_critical(&self) -> bool {
        self.severity == "critical"
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub total: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub critical: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub warning: u64,
}

/// `GET /pnodes/{address}/alerts`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAlertsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alerts: Vec<NodeAlert>,
    pub summary: AlertSummary,
}

/// `GET /registry/{address}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryEntryResponse {
    /// `None` when the registry has no entry for the address.
    pub entry: Option<Node>,
    #[serde(deserialize_with = "lenient_i64")]
    pub last_updated: i64,
}

/// `GET /node/{address}/consistency`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyResponse {
    pub consistency: Consistency,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Consistency {
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_emoji: String,
    #[serde(deserialize_with = "lenient_u64")]
    pub appearances: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub disappearances: u64,
}

/// `GET /recommendations`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<RecommendedNode>,
    #[serde(deserialize_with = "lenient_u64")]
    pub total_evaluated: u64,
    pub filters: RecommendationFiltersEcho,
    #[serde(deserialize_with = "lenient_i64")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendedNode {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(rename = "pubkey", deserialize_with = "null_as_default")]
    pub public_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    pub tier: Tier,
    #[serde(deserialize_with = "null_as_default")]
    pub scores: NodeScores,
    #[serde(deserialize_with = "null_as_default")]
    pub uptime_days: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_usage_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub is_public: bool,
    #[serde(deserialize_with = "lenient_u64")]
    pub peer_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationFiltersEcho {
    #[serde(deserialize_with = "lenient_u64")]
    pub min_uptime_days: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub require_public: bool,
}

/// `GET /network/analytics`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkAnalyticsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub current_state: CurrentState,
    pub growth: Option<GrowthWindows>,
    #[serde(deserialize_with = "null_as_default")]
    pub version_analysis: VersionAnalysis,
    #[serde(deserialize_with = "null_as_default")]
    pub storage_analysis: StorageAnalysis,
    pub connectivity_analysis: Option<ConnectivityAnalysis>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<NetworkRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentState {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_pnodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub public_nodes: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub private_nodes: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub public_ratio_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthWindows {
    #[serde(rename = "24_hours")]
    pub last_24_hours: Option<GrowthPeriod>,
    #[serde(rename = "7_days")]
    pub last_7_days: Option<GrowthPeriod>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPeriod {
    pub start_count: Option<f64>,
    pub end_count: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: BTreeMap<String, u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub latest_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub compliance_percent: f64,
    pub fragmentation_index: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    pub health: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: StorageDistribution,
    pub optimal_percent: Option<f64>,
    pub total_committed: Option<u64>,
    pub total_used: Option<u64>,
    pub utilization_percent: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub health: String,
}

/// Node counts per storage-usage bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageDistribution {
    /// < 10 %
    #[serde(deserialize_with = "lenient_u64")]
    pub empty: u64,
    /// 10-30 %
    #[serde(deserialize_with = "lenient_u64")]
    pub low: u64,
    /// 30-70 %
    #[serde(deserialize_with = "lenient_u64")]
    pub optimal: u64,
    /// 70-90 %
    #[serde(deserialize_with = "lenient_u64")]
    pub high: u64,
    /// >= 90 %
    #[serde(deserialize_with = "lenient_u64")]
    pub critical: u64,
}

impl StorageDistribution {
    pub fn total(&self) -> u64 {
        self.empty + self.low + self.optimal + self.high + self.critical
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub distribution: ConnectivityDistribution,
    #[serde(deserialize_with = "null_as_default")]
    pub well_connected_percent: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub health: String,
}

/// Node counts per peer-count bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityDistribution {
    /// 0-1 peers
    #[serde(deserialize_with = "lenient_u64")]
    pub isolated: u64,
    /// 2 peers
    #[serde(deserialize_with = "lenient_u64")]
    pub weak: u64,
    /// 3-4 peers
    #[serde(deserialize_with = "lenient_u64")]
    pub good: u64,
    /// 5+ peers
    #[serde(deserialize_with = "lenient_u64")]
    pub excellent: u64,
}

impl ConnectivityDistribution {
    pub fn total(&self) -> u64 {
        self.isolated + self.weak + self.good + self.excellent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkRecommendation {
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    /// `high`, `medium`, `low` or `info`
    #[serde(deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
}

/// `GET /pnodes/compare`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub comparison: Vec<Node>,
    #[serde(deserialize_with = "null_as_default")]
    pub winners: BTreeMap<String, RemoteWinner>,
    pub recommendation: RemoteRecommendation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteWinner {
    pub address: Option<String>,
    #[serde(
        alias = "score",
        alias = "uptime",
        alias = "storage",
        alias = "peers",
        deserialize_with = "null_as_default"
    )]
    pub value: f64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteRecommendation {
    pub recommended_node: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(deserialize_with = "null_as_default")]
    pub considerations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Lenient decoding helpers
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Counters may arrive as floats (`12.0`) or be negative in broken data.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v > 0.0).map(|v| v as u64).unwrap_or(0))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v as i64).unwrap_or(0))
}
