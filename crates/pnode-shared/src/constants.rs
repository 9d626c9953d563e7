/// Default telemetry API base URL (local development)
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Age in seconds after which cached telemetry is considered stale
pub const DEFAULT_STALE_SECS: u64 = 30;

/// Background refresh period in seconds for subscribed queries
pub const DEFAULT_REFETCH_SECS: u64 = 60;

/// Retries for the heavier queries (node list, recommendations, analytics)
pub const DEFAULT_RETRIES: u32 = 2;

/// Base delay between retries in milliseconds (doubled per attempt)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Upper bound on a single retry delay in milliseconds
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// Maximum number of nodes in a comparison
pub const MAX_COMPARE_NODES: usize = 5;

/// Node list defaults
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Recommendation defaults
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
pub const DEFAULT_MIN_UPTIME_DAYS: u32 = 7;

/// Network history window in hours
pub const DEFAULT_HISTORY_HOURS: u32 = 24;

/// Version considered current when computing compliance
pub const LATEST_VERSION: &str = "0.7.0";

pub const SECONDS_PER_HOUR: u64 = 3_600;
pub const SECONDS_PER_DAY: u64 = 86_400;
