//! # pnode-shared
//!
//! Types shared by the telemetry client and its consumers: API models,
//! score normalization, tier classification, formatting and errors.

pub mod constants;
pub mod error;
pub mod format;
pub mod models;
pub mod score;
pub mod tier;

pub use error::{QueryError, SelectionError, TransportError, TransportErrorKind};
pub use models::*;
pub use score::{score_breakdown, score_value, Breakdown, Score};
pub use tier::{classify, HealthStatus, ScoreBand, Tier, TierInfo, TierStyle};
