//! Query parameters for the parameterized endpoints.
//!
//! Each parameter set renders both the wire query string and the cache key,
//! so two requests that would hit the API identically share one cache entry.

use std::fmt;

use pnode_shared::constants::{
    DEFAULT_MIN_UPTIME_DAYS, DEFAULT_PAGE_LIMIT, DEFAULT_RECOMMENDATION_LIMIT,
};

use crate::cache::QueryKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeStatus {
    #[default]
    Online,
    Offline,
    All,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Online => "online",
            NodeStatus::Offline => "offline",
            NodeStatus::All => "all",
        }
    }

    pub fn matches(&self, is_online: bool) -> bool {
        match self {
            NodeStatus::Online => is_online,
            NodeStatus::Offline => !is_online,
            NodeStatus::All => true,
        }
    }
}

/// Node list sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Score,
    Uptime,
    StorageUsed,
    LastSeen,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::Uptime => "uptime",
            SortKey::StorageUsed => "storage_used",
            SortKey::LastSeen => "last_seen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(NodeStatus, SortKey, SortOrder);

/// `GET /pnodes` parameters. Defaults: online nodes, top 20 by score.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeListParams {
    pub status: NodeStatus,
    pub limit: usize,
    pub skip: usize,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl Default for NodeListParams {
    fn default() -> Self {
        Self {
            status: NodeStatus::default(),
            limit: DEFAULT_PAGE_LIMIT,
            skip: 0,
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl NodeListParams {
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("status".into(), self.status.to_string()),
            ("limit".into(), self.limit.to_string()),
            ("skip".into(), self.skip.to_string()),
            ("sort_by".into(), self.sort_by.to_string()),
            ("sort_order".into(), self.sort_order.to_string()),
        ]
    }

    pub(crate) fn key(&self) -> QueryKey {
        self.query()
            .into_iter()
            .fold(QueryKey::new("pnodes"), |key, (k, v)| key.param(k, v))
    }
}

/// `GET /recommendations` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecommendationParams {
    pub limit: usize,
    pub min_uptime_days: u32,
    pub require_public: bool,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECOMMENDATION_LIMIT,
            min_uptime_days: DEFAULT_MIN_UPTIME_DAYS,
            require_public: false,
        }
    }
}

impl RecommendationParams {
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("limit".into(), self.limit.to_string()),
            ("min_uptime_days".into(), self.min_uptime_days.to_string()),
            ("require_public".into(), self.require_public.to_string()),
        ]
    }

    pub(crate) fn key(&self) -> QueryKey {
        self.query()
            .into_iter()
            .fold(QueryKey::new("recommendations"), |key, (k, v)| key.param(k, v))
    }
}
