//! # pnode-client
//!
//! Client-side data layer for the pNode telemetry API: a transport gateway,
//! typed endpoints, a keyed query cache with coalescing and background
//! refresh, and the view assemblers built on top of cached node collections.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod params;
pub mod transport;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use api::TelemetryApi;
pub use cache::{QueryCache, QueryKey, QueryPolicy, QueryState, Subscription};
pub use client::TelemetryClient;
pub use config::ClientConfig;
pub use params::{NodeListParams, NodeStatus, RecommendationParams, SortKey, SortOrder};
pub use transport::{HttpTransport, Transport};
