//! # pnode-watch
//!
//! Headless console view of a pNode telemetry API.
//!
//! Subscribes to the dashboard queries (network health, critical alerts and
//! the top of the online leaderboard) and logs a summary every time one of
//! them refreshes, until Ctrl+C.

mod summary;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pnode_client::{ClientConfig, NodeListParams, QueryState, TelemetryClient};

const LEADERBOARD_SIZE: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pnode_client=debug")),
        )
        .init();

    info!("Starting pnode-watch v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration and build the client
    // -----------------------------------------------------------------------
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let client = TelemetryClient::http(config)?;

    // -----------------------------------------------------------------------
    // 3. Subscribe to the dashboard queries
    // -----------------------------------------------------------------------
    let leaderboard = NodeListParams {
        limit: LEADERBOARD_SIZE,
        ..Default::default()
    };

    let mut health = client.subscribe_network_health();
    let mut alerts = client.subscribe_critical_alerts();
    let mut nodes = client.subscribe_pnodes(&leaderboard);

    // -----------------------------------------------------------------------
    // 4. Log every refresh until shutdown
    // -----------------------------------------------------------------------
    loop {
        tokio::select! {
            Some(state) = health.changed() => {
                report("network health", &state, |data| {
                    info!("{}", summary::network_health(data));
                });
            }
            Some(state) = alerts.changed() => {
                report("critical alerts", &state, |data| {
                    info!("{}", summary::critical_alerts(data));
                });
            }
            Some(state) = nodes.changed() => {
                report("leaderboard", &state, |data| {
                    let now = Utc::now().timestamp();
                    info!(
                        total = data.pagination.total,
                        "Top {} online nodes", data.pnodes.len()
                    );
                    for (i, node) in data.pnodes.iter().enumerate() {
                        info!("{}", summary::node_row(i + 1, node, now));
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Log a settled query state; intermediate "fetching" states are skipped.
fn report<T>(name: &str, state: &QueryState<T>, render: impl FnOnce(&T)) {
    if state.is_fetching {
        return;
    }
    if let Some(note) = summary::staleness_note(state) {
        warn!(query = name, "{note}");
    }
    if let Some(data) = &state.data {
        render(data);
    }
}
