//! Network analytics rollup: distribution histograms, health labels and
//! actionable recommendations.

use std::collections::BTreeMap;
use std::fmt;

use pnode_shared::constants::LATEST_VERSION;
use pnode_shared::{
    ConnectivityDistribution, NetworkAnalyticsResponse, NetworkRecommendation, Node,
    StorageDistribution,
};

/// Coarse health label of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Good,
    Fair,
    Poor,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Good => "good",
            Health::Fair => "fair",
            Health::Poor => "poor",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Bucketing
// ---------------------------------------------------------------------------

pub fn storage_bucket(dist: &mut StorageDistribution, usage_percent: f64) {
    match usage_percent {
        u if u < 10.0 => dist.empty += 1,
        u if u < 30.0 => dist.low += 1,
        u if u < 70.0 => dist.optimal += 1,
        u if u < 90.0 => dist.high += 1,
        _ => dist.critical += 1,
    }
}

pub fn connectivity_bucket(dist: &mut ConnectivityDistribution, peers: u64) {
    match peers {
        0 | 1 => dist.isolated += 1,
        2 => dist.weak += 1,
        3 | 4 => dist.good += 1,
        _ => dist.excellent += 1,
    }
}

pub fn storage_distribution(nodes: &[Node]) -> StorageDistribution {
    nodes.iter().fold(StorageDistribution::default(), |mut dist, node| {
        storage_bucket(&mut dist, node.storage_usage_percent);
        dist
    })
}

pub fn connectivity_distribution(nodes: &[Node]) -> ConnectivityDistribution {
    nodes
        .iter()
        .fold(ConnectivityDistribution::default(), |mut dist, node| {
            connectivity_bucket(&mut dist, node.peer_count);
            dist
        })
}

/// Node count per reported version; blank versions count as `unknown`.
pub fn version_distribution(nodes: &[Node]) -> BTreeMap<String, u64> {
    let mut dist = BTreeMap::new();
    for node in nodes {
        let version = match node.version.trim() {
            "" => "unknown",
            v => v,
        };
        *dist.entry(version.to_string()).or_insert(0) += 1;
    }
    dist
}

// ---------------------------------------------------------------------------
// Rollups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct VersionRollup {
    pub latest_version: String,
    pub latest_count: u64,
    pub compliance_percent: f64,
    /// Number of distinct versions in the network.
    pub fragmentation_index: usize,
    pub health: Health,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageRollup {
    pub distribution: StorageDistribution,
    pub optimal_percent: f64,
    pub health: Health,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityRollup {
    pub distribution: ConnectivityDistribution,
    pub well_connected: u64,
    pub well_connected_percent: f64,
    pub health: Health,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsRollup {
    pub total_nodes: u64,
    pub version: VersionRollup,
    pub storage: StorageRollup,
    pub connectivity: ConnectivityRollup,
    pub recommendations: Vec<NetworkRecommendation>,
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = part as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

pub fn version_rollup(distribution: &BTreeMap<String, u64>, latest: &str) -> VersionRollup {
    let total: u64 = distribution.values().sum();
    let latest_count = distribution.get(latest).copied().unwrap_or(0);
    let compliance_percent = percent(latest_count, total);

    let health = if compliance_percent > 70.0 {
        Health::Good
    } else if compliance_percent > 50.0 {
        Health::Fair
    } else {
        Health::Poor
    };

    VersionRollup {
        latest_version: latest.to_string(),
        latest_count,
        compliance_percent,
        fragmentation_index: distribution.len(),
        health,
    }
}

pub fn storage_rollup(distribution: StorageDistribution) -> StorageRollup {
    let health = if distribution.optimal > distribution.critical {
        Health::Good
    } else {
        Health::Fair
    };
    StorageRollup {
        distribution,
        optimal_percent: percent(distribution.optimal, distribution.total()),
        health,
    }
}

pub fn connectivity_rollup(distribution: ConnectivityDistribution) -> ConnectivityRollup {
    let total = distribution.total();
    let well_connected = distribution.good + distribution.excellent;
    let health = if (distribution.isolated as f64) < total as f64 * 0.1 {
        Health::Good
    } else {
        Health::Fair
    };
    ConnectivityRollup {
        distribution,
        well_connected,
        well_connected_percent: percent(well_connected, total),
        health,
    }
}

fn recommendation(category: &str, severity: &str, message: String, action: &str) -> NetworkRecommendation {
    NetworkRecommendation {
        category: category.into(),
        severity: severity.into(),
        message,
        action: action.into(),
    }
}

/// Actionable findings; a single informational entry when nothing stands out.
pub fn network_recommendations(
    version: &VersionRollup,
    storage: &StorageDistribution,
    connectivity: &ConnectivityDistribution,
    total_nodes: u64,
) -> Vec<NetworkRecommendation> {
    let tenth = total_nodes as f64 * 0.1;
    let mut out = Vec::new();

    if version.compliance_percent < 70.0 {
        let severity = if version.compliance_percent < 50.0 {
            "high"
        } else {
            "medium"
        };
        out.push(recommendation(
            "version",
            severity,
            format!(
                "Only {:.1}% of nodes are on the latest version",
                version.compliance_percent
            ),
            &format!("Encourage operators to upgrade to v{}", version.latest_version),
        ));
    }

    if storage.critical as f64 > tenth {
        out.push(recommendation(
            "storage",
            "high",
            format!("{} nodes at critical storage capacity (>90%)", storage.critical),
            "Monitor these nodes closely or increase storage allocation",
        ));
    }

    if storage.empty as f64 > total_nodes as f64 * 0.3 {
        out.push(recommendation(
            "storage",
            "low",
            format!("{} nodes are underutilized (<10% usage)", storage.empty),
            "Network may be over-provisioned or needs more usage",
        ));
    }

    if connectivity.isolated as f64 > tenth {
        out.push(recommendation(
            "connectivity",
            "high",
            format!(
                "{} nodes have weak connectivity (≤1 peer)",
                connectivity.isolated
            ),
            "Check network configuration and gossip protocol health",
        ));
    }

    if out.is_empty() {
        out.push(recommendation(
            "general",
            "info",
            "Network health is good".into(),
            "Continue monitoring",
        ));
    }

    out
}

fn assemble(
    total_nodes: u64,
    versions: &BTreeMap<String, u64>,
    latest: &str,
    storage: StorageDistribution,
    connectivity: ConnectivityDistribution,
) -> AnalyticsRollup {
    let version = version_rollup(versions, latest);
    let recommendations = network_recommendations(&version, &storage, &connectivity, total_nodes);
    AnalyticsRollup {
        total_nodes,
        version,
        storage: storage_rollup(storage),
        connectivity: connectivity_rollup(connectivity),
        recommendations,
    }
}

/// Full rollup computed from a node collection.
pub fn rollup_nodes(nodes: &[Node]) -> AnalyticsRollup {
    assemble(
        nodes.len() as u64,
        &version_distribution(nodes),
        LATEST_VERSION,
        storage_distribution(nodes),
        connectivity_distribution(nodes),
    )
}

/// Rollup recomputed from the raw histograms of an analytics response.
pub fn rollup_response(response: &NetworkAnalyticsResponse) -> AnalyticsRollup {
    let latest = match response.version_analysis.latest_version.as_str() {
        "" => LATEST_VERSION,
        v => v,
    };
    let connectivity = response
        .connectivity_analysis
        .as_ref()
        .map(|c| c.distribution)
        .unwrap_or_default();

    assemble(
        response.current_state.total_pnodes,
        &response.version_analysis.distribution,
        latest,
        response.storage_analysis.distribution,
        connectivity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(version: &str, usage: f64, peers: u64) -> Node {
        Node {
            version: version.into(),
            storage_usage_percent: usage,
            peer_count: peers,
            ..Default::default()
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        let nodes: Vec<Node> = [0.0, 9.99, 10.0, 29.9, 30.0, 69.9, 70.0, 89.9, 90.0, 100.0]
            .iter()
            .map(|&u| node("0.7.0", u, 0))
            .collect();
        let dist = storage_distribution(&nodes);
        assert_eq!(
            dist,
            StorageDistribution {
                empty: 2,
                low: 2,
                optimal: 2,
                high: 2,
                critical: 2
            }
        );

        let nodes: Vec<Node> = (0..7).map(|p| node("0.7.0", 0.0, p)).collect();
        let dist = connectivity_distribution(&nodes);
        assert_eq!(
            dist,
            ConnectivityDistribution {
                isolated: 2,
                weak: 1,
                good: 2,
                excellent: 2
            }
        );
    }

    #[test]
    fn test_well_connected_percent() {
        let rollup = connectivity_rollup(ConnectivityDistribution {
            isolated: 1,
            weak: 3,
            good: 4,
            excellent: 12,
        });
        assert_eq!(rollup.well_connected, 16);
        assert_eq!(rollup.well_connected_percent, 80.0);
        assert_eq!(rollup.health, Health::Good);

        let isolated = connectivity_rollup(ConnectivityDistribution {
            isolated: 2,
            weak: 0,
            good: 8,
            excellent: 10,
        });
        assert_eq!(isolated.health, Health::Fair);
    }

    #[test]
    fn test_version_health_thresholds() {
        let dist = |latest: u64, old: u64| {
            BTreeMap::from([("0.7.0".to_string(), latest), ("0.6.2".to_string(), old)])
        };
        assert_eq!(version_rollup(&dist(71, 29), "0.7.0").health, Health::Good);
        assert_eq!(version_rollup(&dist(70, 30), "0.7.0").health, Health::Fair);
        assert_eq!(version_rollup(&dist(50, 50), "0.7.0").health, Health::Poor);
        assert_eq!(version_rollup(&dist(2, 1), "0.7.0").compliance_percent, 66.67);
    }

    #[test]
    fn test_empty_network_yields_zero_percentages() {
        let rollup = rollup_nodes(&[]);
        assert_eq!(rollup.version.compliance_percent, 0.0);
        assert_eq!(rollup.storage.optimal_percent, 0.0);
        assert_eq!(rollup.connectivity.well_connected_percent, 0.0);
        // Zero compliance still warrants an upgrade notice.
        assert_eq!(rollup.recommendations[0].category, "version");
        assert_eq!(rollup.recommendations[0].severity, "high");
    }

    #[test]
    fn test_healthy_network_single_info_recommendation() {
        let nodes: Vec<Node> = (0..10).map(|_| node("0.7.0", 50.0, 6)).collect();
        let rollup = rollup_nodes(&nodes);
        assert_eq!(rollup.storage.health, Health::Good);
        assert_eq!(
            rollup.recommendations,
            vec![NetworkRecommendation {
                category: "general".into(),
                severity: "info".into(),
                message: "Network health is good".into(),
                action: "Continue monitoring".into(),
            }]
        );
    }

    #[test]
    fn test_unhealthy_network_recommendations() {
        let mut nodes: Vec<Node> = (0..6).map(|_| node("0.7.0", 5.0, 0)).collect();
        nodes.extend((0..4).map(|_| node("0.6.0", 95.0, 5)));

        let rollup = rollup_nodes(&nodes);
        let found: Vec<(&str, &str)> = rollup
            .recommendations
            .iter()
            .map(|r| (r.category.as_str(), r.severity.as_str()))
            .collect();
        assert_eq!(
            found,
            [
                ("version", "medium"),
                ("storage", "high"),
                ("storage", "low"),
                ("connectivity", "high"),
            ]
        );
        assert_eq!(
            rollup.recommendations[0].message,
            "Only 60.0% of nodes are on the latest version"
        );
        assert_eq!(rollup.version.fragmentation_index, 2);
    }

    #[test]
    fn test_rollup_from_response_histograms() {
        let mut response = NetworkAnalyticsResponse::default();
        response.current_state.total_pnodes = 4;
        response.version_analysis.distribution = BTreeMap::from([("0.7.0".to_string(), 4)]);
        response.storage_analysis.distribution = StorageDistribution {
            optimal: 3,
            critical: 1,
            ..Default::default()
        };

        let rollup = rollup_response(&response);
        assert_eq!(rollup.version.latest_version, LATEST_VERSION);
        assert_eq!(rollup.version.compliance_percent, 100.0);
        assert_eq!(rollup.storage.optimal_percent, 75.0);
        assert_eq!(rollup.connectivity.well_connected_percent, 0.0);
    }

    #[test]
    fn test_blank_versions_grouped_as_unknown() {
        let dist = version_distribution(&[node("", 0.0, 0), node(" ", 0.0, 0), node("0.7.0", 0.0, 0)]);
        assert_eq!(dist.get("unknown"), Some(&2));
    }
}
