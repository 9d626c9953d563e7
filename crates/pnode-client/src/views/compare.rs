//! Side-by-side comparison of a bounded node selection.

use pnode_shared::constants::MAX_COMPARE_NODES;
use pnode_shared::{Node, SelectionError};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Ordered set of at most [`MAX_COMPARE_NODES`] addresses.
///
/// Insertion order is the reduction order used to break ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    addresses: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, address: impl Into<String>) -> Result<(), SelectionError> {
        let address = address.into();
        if self.contains(&address) {
            return Err(SelectionError::Duplicate { address });
        }
        if self.is_full() {
            return Err(SelectionError::Full {
                max: MAX_COMPARE_NODES,
            });
        }
        self.addresses.push(address);
        Ok(())
    }

    /// Remove `address` if selected, otherwise add it.
    ///
    /// Returns whether the address is selected afterwards.
    pub fn toggle(&mut self, address: &str) -> Result<bool, SelectionError> {
        if self.remove(address) {
            return Ok(false);
        }
        self.add(address)?;
        Ok(true)
    }

    pub fn remove(&mut self, address: &str) -> bool {
        let before = self.addresses.len();
        self.addresses.retain(|a| a != address);
        self.addresses.len() != before
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.iter().any(|a| a == address)
    }

    pub fn is_full(&self) -> bool {
        self.addresses.len() >= MAX_COMPARE_NODES
    }

    /// A comparison needs at least two nodes.
    pub fn is_comparable(&self) -> bool {
        self.addresses.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Winner {
    pub address: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Winners {
    pub overall_score: Winner,
    pub trust: Winner,
    pub capacity: Winner,
    pub uptime: Winner,
    pub storage_committed: Winner,
    pub connectivity: Winner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub address: String,
    pub reason: String,
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub winners: Winners,
    pub recommendation: Recommendation,
}

/// Strict greater-than fold seeded with the first node: on equal values the
/// earliest node keeps the title.
fn winner_by(nodes: &[Node], metric: impl Fn(&Node) -> f64) -> Option<Winner> {
    let (first, rest) = nodes.split_first()?;
    let seed = Winner {
        address: first.address.clone(),
        value: metric(first),
    };
    Some(rest.iter().fold(seed, |best, node| {
        let value = metric(node);
        if value > best.value {
            Winner {
                address: node.address.clone(),
                value,
            }
        } else {
            best
        }
    }))
}

/// Per-metric winners and a recommendation for `nodes`, in selection order.
///
/// Returns `None` for an empty slice or more than [`MAX_COMPARE_NODES`] nodes.
pub fn compare(nodes: &[Node]) -> Option<Comparison> {
    if nodes.len() > MAX_COMPARE_NODES {
        return None;
    }
    let winners = Winners {
        overall_score: winner_by(nodes, |n| n.score)?,
        trust: winner_by(nodes, Node::trust)?,
        capacity: winner_by(nodes, Node::capacity)?,
        uptime: winner_by(nodes, |n| n.uptime_seconds as f64)?,
        storage_committed: winner_by(nodes, |n| n.storage_committed as f64)?,
        connectivity: winner_by(nodes, |n| n.peer_count as f64)?,
    };

    let recommendation = recommend(nodes, &winners);
    Some(Comparison {
        winners,
        recommendation,
    })
}

fn recommend(nodes: &[Node], winners: &Winners) -> Recommendation {
    let best = &winners.overall_score;
    let mut considerations = Vec::new();

    if winners.trust.address != best.address {
        considerations.push(format!(
            "{} has better reliability (trust score: {:.1})",
            winners.trust.address, winners.trust.value
        ));
    }

    if winners.capacity.address != best.address {
        considerations.push(format!(
            "{} has better storage management (capacity score: {:.1})",
            winners.capacity.address, winners.capacity.value
        ));
    }

    let offline: Vec<&str> = nodes
        .iter()
        .filter(|n| !n.is_online)
        .map(|n| n.address.as_str())
        .collect();
    if !offline.is_empty() {
        considerations.push(format!(
            "⚠️ These nodes are currently offline: {}",
            offline.join(", ")
        ));
    }

    Recommendation {
        address: best.address.clone(),
        reason: format!("Highest overall score ({:.1}/100)", best.value),
        considerations,
    }
}
