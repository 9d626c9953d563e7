//! View assemblers: synchronous transforms from cached payloads to
//! view-ready structures.

pub mod analytics;
pub mod compare;
pub mod history;
pub mod leaderboard;
pub mod recommend;

pub use analytics::{rollup_nodes, rollup_response, AnalyticsRollup, Health};
pub use compare::{compare, Comparison, Selection, Winner, Winners};
pub use history::{summarize, GrowthSummary, Trend};
pub use leaderboard::{select_nodes, sort_nodes, top_nodes, Page};
pub use recommend::{recommend, RecommendationReport};
