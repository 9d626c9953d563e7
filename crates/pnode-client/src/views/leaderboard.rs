//! Leaderboard selection and offset pagination over node collections.

use std::cmp::Ordering;

use pnode_shared::Node;

use crate::params::{NodeListParams, SortKey, SortOrder};

fn compare_by(a: &Node, b: &Node, key: SortKey) -> Ordering {
    match key {
        SortKey::Score => a.score.total_cmp(&b.score),
        SortKey::Uptime => a.uptime_seconds.cmp(&b.uptime_seconds),
        SortKey::StorageUsed => a.storage_used.cmp(&b.storage_used),
        SortKey::LastSeen => a.last_seen.cmp(&b.last_seen),
    }
}

/// Sort in place. Equal keys keep their input order in both directions.
pub fn sort_nodes(nodes: &mut [Node], key: SortKey, order: SortOrder) {
    nodes.sort_by(|a, b| match order {
        SortOrder::Asc => compare_by(a, b, key),
        SortOrder::Desc => compare_by(b, a, key),
    });
}

/// Top `n` nodes by `key`.
pub fn top_nodes(nodes: &[Node], key: SortKey, order: SortOrder, n: usize) -> Vec<Node> {
    let mut sorted = nodes.to_vec();
    sort_nodes(&mut sorted, key, order);
    sorted.truncate(n);
    sorted
}

/// Apply node list parameters locally: status filter, sort, then skip/limit.
pub fn select_nodes(nodes: &[Node], params: &NodeListParams) -> Vec<Node> {
    let mut selected: Vec<Node> = nodes
        .iter()
        .filter(|node| params.status.matches(node.is_online))
        .cloned()
        .collect();
    sort_nodes(&mut selected, params.sort_by, params.sort_order);
    selected
        .into_iter()
        .skip(params.skip)
        .take(params.limit)
        .collect()
}

/// Offset page cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(limit: usize) -> Self {
        Self { skip: 0, limit }
    }

    pub fn next(self) -> Self {
        Self {
            skip: self.skip + self.limit,
            ..self
        }
    }

    pub fn previous(self) -> Self {
        Self {
            skip: self.skip.saturating_sub(self.limit),
            ..self
        }
    }

    pub fn has_next(&self, total: u64) -> bool {
        ((self.skip + self.limit) as u64) < total
    }

    pub fn has_previous(&self) -> bool {
        self.skip > 0
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        match self.limit {
            0 => 1,
            limit => self.skip / limit + 1,
        }
    }

    pub fn apply(self, params: &NodeListParams) -> NodeListParams {
        NodeListParams {
            skip: self.skip,
            limit: self.limit,
            ..params.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::NodeStatus;

    fn node(address: &str, score: f64, online: bool) -> Node {
        Node {
            address: address.into(),
            score,
            is_online: online,
            ..Default::default()
        }
    }

    fn addresses(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.address.as_str()).collect()
    }

    #[test]
    fn test_ties_keep_input_order() {
        let nodes = vec![
            node("a", 80.0, true),
            node("b", 90.0, true),
            node("c", 80.0, true),
            node("d", 90.0, true),
        ];

        let desc = top_nodes(&nodes, SortKey::Score, SortOrder::Desc, 10);
        assert_eq!(addresses(&desc), ["b", "d", "a", "c"]);

        let asc = top_nodes(&nodes, SortKey::Score, SortOrder::Asc, 10);
        assert_eq!(addresses(&asc), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let nodes: Vec<Node> = (0..8).map(|i| node(&i.to_string(), i as f64, true)).collect();
        let top = top_nodes(&nodes, SortKey::Score, SortOrder::Desc, 3);
        assert_eq!(addresses(&top), ["7", "6", "5"]);
    }

    #[test]
    fn test_sort_by_other_keys() {
        let mut nodes = vec![node("a", 0.0, true), node("b", 0.0, true)];
        nodes[0].uptime_seconds = 10;
        nodes[1].uptime_seconds = 20;
        nodes[0].storage_used = 500;
        nodes[1].storage_used = 100;
        nodes[0].last_seen = 2;
        nodes[1].last_seen = 1;

        assert_eq!(addresses(&top_nodes(&nodes, SortKey::Uptime, SortOrder::Desc, 1)), ["b"]);
        assert_eq!(addresses(&top_nodes(&nodes, SortKey::StorageUsed, SortOrder::Desc, 1)), ["a"]);
        assert_eq!(addresses(&top_nodes(&nodes, SortKey::LastSeen, SortOrder::Asc, 1)), ["b"]);
    }

    #[test]
    fn test_select_filters_then_pages() {
        let nodes = vec![
            node("a", 50.0, true),
            node("b", 99.0, false),
            node("c", 70.0, true),
            node("d", 60.0, true),
        ];
        let params = NodeListParams {
            status: NodeStatus::Online,
            limit: 2,
            skip: 1,
            ..Default::default()
        };
        assert_eq!(addresses(&select_nodes(&nodes, &params)), ["d", "a"]);

        let offline = NodeListParams {
            status: NodeStatus::Offline,
            ..Default::default()
        };
        assert_eq!(addresses(&select_nodes(&nodes, &offline)), ["b"]);
    }

    #[test]
    fn test_page_navigation() {
        let page = Page::new(20);
        assert!(!page.has_previous());
        assert!(page.has_next(45));

        let third = page.next().next();
        assert_eq!(third.skip, 40);
        assert_eq!(third.number(), 3);
        assert!(!third.has_next(45));

        assert_eq!(Page { skip: 10, limit: 20 }.previous().skip, 0);
        assert_eq!(third.previous().skip, 20);
    }
}
