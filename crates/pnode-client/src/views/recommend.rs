//! Staking recommendations from a node collection.

use pnode_shared::constants::SECONDS_PER_DAY;
use pnode_shared::{Node, RecommendedNode};

use crate::params::RecommendationParams;

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationReport {
    /// Best candidates first, at most `limit`.
    pub recommendations: Vec<Node>,
    /// Nodes considered.
    pub evaluated: usize,
    /// Nodes that met every filter, before the limit was applied.
    pub passed: usize,
}

/// Whether `node` meets the online, uptime and visibility requirements.
pub fn qualifies(node: &Node, params: &RecommendationParams) -> bool {
    let min_uptime = u64::from(params.min_uptime_days) * SECONDS_PER_DAY;
    node.is_online
        && node.uptime_seconds >= min_uptime
        && (!params.require_public || node.is_public)
}

/// Filter by [`qualifies`], order by score descending (stable) and truncate.
pub fn recommend(nodes: &[Node], params: &RecommendationParams) -> RecommendationReport {
    let mut passed: Vec<Node> = nodes
        .iter()
        .filter(|node| qualifies(node, params))
        .cloned()
        .collect();
    passed.sort_by(|a, b| b.score.total_cmp(&a.score));

    let passed_count = passed.len();
    passed.truncate(params.limit);

    RecommendationReport {
        recommendations: passed,
        evaluated: nodes.len(),
        passed: passed_count,
    }
}

/// Recommendation row as served by the API.
pub fn to_recommended(node: &Node) -> RecommendedNode {
    RecommendedNode {
        address: node.address.clone(),
        public_key: node.public_key.clone(),
        score: node.score,
        tier: node.tier.clone(),
        scores: node.scores.clone(),
        uptime_days: (node.uptime_days() * 10.0).round() / 10.0,
        version: node.version.clone(),
        storage_usage_percent: node.storage_usage_percent,
        is_public: node.is_public,
        peer_count: node.peer_count,
    }
}
