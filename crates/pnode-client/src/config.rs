//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local telemetry API.

use std::time::Duration;

use pnode_shared::constants::{
    DEFAULT_API_URL, DEFAULT_REFETCH_SECS, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_STALE_SECS, DEFAULT_TIMEOUT_SECS,
};

use crate::cache::QueryPolicy;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the telemetry API.
    /// Env: `PNODE_API_URL`
    /// Default: `http://127.0.0.1:8000`
    pub api_url: String,

    /// Timeout applied to every request; expiry counts as a transport failure.
    /// Env: `PNODE_TIMEOUT_SECS`
    /// Default: `30`
    pub request_timeout: Duration,

    /// Age after which cached data is stale (still served, refreshed in background).
    /// Env: `PNODE_STALE_SECS`
    /// Default: `30`
    pub stale_time: Duration,

    /// Background refresh period while a query has subscribers.
    /// Env: `PNODE_REFETCH_SECS`
    /// Default: `60`
    pub refetch_interval: Duration,

    /// Retries for the node list, recommendations and analytics queries.
    /// Env: `PNODE_RETRIES`
    /// Default: `2`
    pub retries: u32,

    /// Delay before the first retry; doubles per attempt.
    /// Env: `PNODE_RETRY_DELAY_MS`
    /// Default: `1000`
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            refetch_interval: Duration::from_secs(DEFAULT_REFETCH_SECS),
            retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("PNODE_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_url = url.to_string();
            } else {
                tracing::warn!(value = %url, "Invalid PNODE_API_URL, using default");
            }
        }

        if let Some(secs) = parse_env::<u64>("PNODE_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(secs) = parse_env::<u64>("PNODE_STALE_SECS") {
            config.stale_time = Duration::from_secs(secs);
        }

        if let Some(secs) = parse_env::<u64>("PNODE_REFETCH_SECS") {
            config.refetch_interval = Duration::from_secs(secs.max(1));
        }

        if let Some(n) = parse_env::<u32>("PNODE_RETRIES") {
            config.retries = n;
        }

        if let Some(ms) = parse_env::<u64>("PNODE_RETRY_DELAY_MS") {
            config.retry_delay = Duration::from_millis(ms);
        }

        config
    }

    /// Policy for the dashboard-wide queries (health, history, alerts).
    pub fn standard_policy(&self) -> QueryPolicy {
        QueryPolicy {
            stale_time: self.stale_time,
            refetch_interval: Some(self.refetch_interval),
            retries: 1,
            retry_delay: self.retry_delay,
            timeout: self.request_timeout,
        }
    }

    /// Policy for the heavier list queries.
    pub fn list_policy(&self) -> QueryPolicy {
        QueryPolicy {
            retries: self.retries,
            ..self.standard_policy()
        }
    }

    /// Policy for single-node queries: always refreshed in the background on read.
    pub fn node_policy(&self) -> QueryPolicy {
        QueryPolicy {
            stale_time: Duration::ZERO,
            ..self.standard_policy()
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.stale_time, Duration::from_secs(30));
        assert_eq!(config.refetch_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_policies() {
        let config = ClientConfig::default();
        assert_eq!(config.standard_policy().retries, 1);
        assert_eq!(config.list_policy().retries, 2);
        assert_eq!(config.node_policy().stale_time, Duration::ZERO);
        assert_eq!(
            config.node_policy().refetch_interval,
            Some(Duration::from_secs(60))
        );
    }
}
