//! Growth summary over a chronological snapshot series.

use std::fmt;

use pnode_shared::NetworkSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Growing,
    Stable,
    Declining,
}

impl Trend {
    fn of(change: f64) -> Self {
        if change > 0.0 {
            Trend::Growing
        } else if change < 0.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Growing => "growing",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityTrend {
    Improving,
    Stable,
    Declining,
}

impl ConnectivityTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectivityTrend::Improving => "improving",
            ConnectivityTrend::Stable => "stable",
            ConnectivityTrend::Declining => "declining",
        }
    }
}

/// Change of one metric between the first and last snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Growth {
    pub start: f64,
    pub end: f64,
    pub change: f64,
    /// Relative to `start`; 0 when `start` is 0.
    pub percent: f64,
    pub trend: Trend,
}

impl Growth {
    fn between(start: f64, end: f64) -> Self {
        let change = end - start;
        let percent = if start > 0.0 {
            round2(change / start * 100.0)
        } else {
            0.0
        };
        Self {
            start,
            end,
            change,
            percent,
            trend: Trend::of(change),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthSummary {
    pub data_points: usize,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub nodes: Growth,
    pub storage: Growth,
    pub peer_change: f64,
    pub connectivity: ConnectivityTrend,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Summarize `history`, which must be in chronological order.
///
/// Returns `None` for an empty series.
pub fn summarize(history: &[NetworkSnapshot]) -> Option<GrowthSummary> {
    let first = history.first()?;
    let last = history.last()?;

    let peer_change = round2(last.avg_peer_count - first.avg_peer_count);
    let connectivity = if peer_change > 0.0 {
        ConnectivityTrend::Improving
    } else if peer_change < 0.0 {
        ConnectivityTrend::Declining
    } else {
        ConnectivityTrend::Stable
    };

    Some(GrowthSummary {
        data_points: history.len(),
        start_timestamp: first.timestamp,
        end_timestamp: last.timestamp,
        nodes: Growth::between(first.total_pnodes as f64, last.total_pnodes as f64),
        storage: Growth::between(
            first.total_storage_committed as f64,
            last.total_storage_committed as f64,
        ),
        peer_change,
        connectivity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: i64, total: u64, storage: u64, peers: f64) -> NetworkSnapshot {
        NetworkSnapshot {
            timestamp,
            total_pnodes: total,
            online_pnodes: total,
            total_storage_committed: storage,
            avg_peer_count: peers,
        }
    }

    #[test]
    fn test_growing_network() {
        let history = vec![
            snapshot(100, 80, 1_000, 3.0),
            snapshot(200, 95, 900, 3.0),
            snapshot(300, 100, 800, 4.25),
        ];
        let summary = summarize(&history).unwrap();

        assert_eq!(summary.data_points, 3);
        assert_eq!(summary.start_timestamp, 100);
        assert_eq!(summary.nodes.change, 20.0);
        assert_eq!(summary.nodes.percent, 25.0);
        assert_eq!(summary.nodes.trend, Trend::Growing);
        assert_eq!(summary.storage.percent, -20.0);
        assert_eq!(summary.storage.trend, Trend::Declining);
        assert_eq!(summary.peer_change, 1.25);
        assert_eq!(summary.connectivity, ConnectivityTrend::Improving);
    }

    #[test]
    fn test_zero_start_and_single_point() {
        let summary = summarize(&[snapshot(1, 0, 0, 0.0), snapshot(2, 12, 0, 0.0)]).unwrap();
        assert_eq!(summary.nodes.percent, 0.0);
        assert_eq!(summary.nodes.trend, Trend::Growing);
        assert_eq!(summary.storage.trend, Trend::Stable);

        let single = summarize(&[snapshot(1, 5, 5, 2.0)]).unwrap();
        assert_eq!(single.nodes.trend, Trend::Stable);
        assert_eq!(single.connectivity, ConnectivityTrend::Stable);

        assert!(summarize(&[]).is_none());
    }
}
