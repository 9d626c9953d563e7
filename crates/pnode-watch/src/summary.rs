//! One-line console summaries of the watched queries.

use pnode_client::QueryState;
use pnode_shared::format::{format_bytes, format_percent, format_uptime, shorten_address, time_ago_at};
use pnode_shared::{AlertsResponse, NetworkHealthResponse, Node, ScoreBand};

pub fn network_health(response: &NetworkHealthResponse) -> String {
    let health = &response.health;
    let summary = &response.summary;
    let status = match health.status.as_str() {
        "" => "unknown",
        s => s,
    };
    format!(
        "{} {} ({:.1}) | {} online / {} offline | {} committed",
        health.status.emoji(),
        status,
        health.health_score,
        summary.online_pnodes,
        summary.offline_pnodes,
        format_bytes(summary.total_storage, 2),
    )
}

pub fn critical_alerts(response: &AlertsResponse) -> String {
    let summary = &response.summary;
    if response.critical_nodes.is_empty() {
        return "no critical alerts".to_string();
    }
    let worst: Vec<String> = response
        .critical_nodes
        .iter()
        .take(3)
        .map(|n| shorten_address(&n.address, 6))
        .collect();
    format!(
        "{} critical / {} warning across {} nodes: {}",
        summary.critical,
        summary.warning,
        response.critical_nodes.len(),
        worst.join(", ")
    )
}

/// `#1 8dRqT9...1gA6sE  95.4 excellent  ⭐ Elite  up 12d 3h  seen 2m ago  disk 42.0%`
pub fn node_row(rank: usize, node: &Node, now: i64) -> String {
    let tier = node.tier_info();
    let band = match ScoreBand::of(node.score) {
        ScoreBand::Excellent => "excellent",
        ScoreBand::Good => "good",
        ScoreBand::Fair => "fair",
        ScoreBand::Poor => "poor",
    };
    format!(
        "#{rank} {}  {:.1} {band}  {} {}  up {}  seen {}  disk {}",
        shorten_address(&node.address, 6),
        node.score,
        tier.emoji,
        tier.label,
        format_uptime(node.uptime_seconds),
        time_ago_at(node.last_seen, now),
        format_percent(node.storage_usage_percent),
    )
}

/// Note shown next to data that failed to refresh.
pub fn staleness_note<T>(state: &QueryState<T>) -> Option<String> {
    let error = state.error.as_ref()?;
    Some(match state.data {
        Some(_) => format!("showing cached data, refresh failed: {error}"),
        None => format!("no data: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnode_shared::{CriticalNode, HealthStatus, QueryError, Tier};

    #[test]
    fn test_network_health_line() {
        let mut response = NetworkHealthResponse::default();
        response.health.health_score = 88.24;
        response.health.status = HealthStatus::Healthy;
        response.summary.online_pnodes = 120;
        response.summary.offline_pnodes = 4;
        response.summary.total_storage = 3 * 1024 * 1024 * 1024 * 1024;

        assert_eq!(
            network_health(&response),
            "🟢 healthy (88.2) | 120 online / 4 offline | 3 TB committed"
        );
    }

    #[test]
    fn test_unknown_status_is_neutral() {
        let response = NetworkHealthResponse::default();
        assert!(network_health(&response).starts_with("⚪ unknown"));
    }

    #[test]
    fn test_alerts_line() {
        assert_eq!(critical_alerts(&AlertsResponse::default()), "no critical alerts");

        let mut response = AlertsResponse::default();
        response.critical_nodes.push(CriticalNode {
            address: "8dRqT9xY2bKpL4mN7vWz3cJ5hF1gA6sE".into(),
            alerts: Vec::new(),
        });
        response.summary.critical = 1;
        assert_eq!(
            critical_alerts(&response),
            "1 critical / 0 warning across 1 nodes: 8dRqT9...1gA6sE"
        );
    }

    #[test]
    fn test_node_row() {
        let node = Node {
            address: "10.0.0.1:9001".into(),
            score: 95.44,
            tier: Tier::Elite,
            uptime_seconds: 3 * 86_400 + 4 * 3_600,
            last_seen: 1_000,
            storage_usage_percent: 42.0,
            ..Default::default()
        };
        assert_eq!(
            node_row(1, &node, 1_120),
            "#1 10.0.0.1:9001  95.4 excellent  ⭐ Elite  up 3d 4h  seen 2m ago  disk 42.0%"
        );
    }

    #[test]
    fn test_staleness_note() {
        let mut state: QueryState<u32> = QueryState::default();
        assert_eq!(staleness_note(&state), None);

        state.error = Some(QueryError::NotFound("/health".into()));
        assert_eq!(staleness_note(&state).unwrap(), "no data: Not found: /health");

        state.data = Some(1);
        assert!(staleness_note(&state)
            .unwrap()
            .starts_with("showing cached data"));
    }
}
