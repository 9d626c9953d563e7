//! Score normalization.
//!
//! The telemetry API reports sub-scores either as a bare number or as an
//! object carrying the number plus a named breakdown. Both shapes decode into
//! [`Score`] so consumers never inspect raw JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Named decomposition of a score into contributing sub-metrics.
pub type Breakdown = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Plain(f64),
    WithBreakdown {
        /// `None` only when upstream sent an object without a `score` field.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
        #[serde(
            default,
            deserialize_with = "lenient_breakdown",
            skip_serializing_if = "Option::is_none"
        )]
        breakdown: Option<Breakdown>,
    },
}

impl Score {
    pub fn detailed(score: f64, breakdown: Breakdown) -> Self {
        Score::WithBreakdown {
            score: Some(score),
            breakdown: Some(breakdown),
        }
    }

    pub fn value(&self) -> f64 {
        score_value(self)
    }

    pub fn breakdown(&self) -> Option<&Breakdown> {
        score_breakdown(self)
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::Plain(0.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::Plain(value)
    }
}

/// Numeric value of a score in either shape.
///
/// An object without a `score` field yields `0.0` and a warning.
pub fn score_value(score: &Score) -> f64 {
    match score {
        Score::Plain(value) => *value,
        Score::WithBreakdown { score: Some(value), .. } => *value,
        Score::WithBreakdown { score: None, .. } => {
            warn!("Structured score without a `score` field, using 0");
            0.0
        }
    }
}

/// Breakdown of a structured score; `None` for bare numbers.
pub fn score_breakdown(score: &Score) -> Option<&Breakdown> {
    match score {
        Score::Plain(_) => None,
        Score::WithBreakdown { breakdown, .. } => breakdown.as_ref(),
    }
}

/// Accept any JSON object as a breakdown, keeping only numeric entries.
///
/// Some endpoints nest per-category objects inside `breakdown`; those entries
/// are dropped instead of failing the whole record.
pub(crate) fn lenient_breakdown<'de, D>(deserializer: D) -> Result<Option<Breakdown>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Map<String, serde_json::Value>> =
        Option::deserialize(deserializer)?;

    Ok(raw.map(|map| {
        map.into_iter()
            .filter_map(|(name, value)| value.as_f64().map(|v| (name, v)))
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_number() {
        let score: Score = serde_json::from_value(json!(87.5)).unwrap();
        assert_eq!(score, Score::Plain(87.5));
        assert_eq!(score_value(&score), 87.5);
        assert!(score_breakdown(&score).is_none());
    }

    #[test]
    fn test_integer_is_plain() {
        let score: Score = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(score.value(), 42.0);
    }

    #[test]
    fn test_structured_with_breakdown() {
        let score: Score = serde_json::from_value(json!({
            "score": 91.2,
            "breakdown": { "uptime": 40.0, "consistency": 30.2, "version": 21 }
        }))
        .unwrap();

        assert_eq!(score.value(), 91.2);
        let breakdown = score.breakdown().unwrap();
        assert_eq!(breakdown.len(), 3);
        assert_eq!(breakdown["version"], 21.0);
    }

    #[test]
    fn test_structured_without_breakdown() {
        let score: Score = serde_json::from_value(json!({ "score": 12.0 })).unwrap();
        assert_eq!(score.value(), 12.0);
        assert!(score.breakdown().is_none());
    }

    #[test]
    fn test_missing_score_field_fails_closed() {
        let score: Score =
            serde_json::from_value(json!({ "breakdown": { "uptime": 10.0 } })).unwrap();
        assert_eq!(score_value(&score), 0.0);
        assert_eq!(score_breakdown(&score).unwrap()["uptime"], 10.0);
    }

    #[test]
    fn test_nested_breakdown_entries_are_dropped() {
        let score: Score = serde_json::from_value(json!({
            "score": 50.0,
            "breakdown": { "trust": { "uptime": 1.0 }, "peers": 4.0 }
        }))
        .unwrap();
        let breakdown = score.breakdown().unwrap();
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown["peers"], 4.0);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        for x in [0.0, 12.5, 99.9, -3.0, 140.0] {
            let plain = Score::Plain(x);
            assert_eq!(score_value(&Score::Plain(score_value(&plain))), x);

            let detailed = Score::detailed(x, Breakdown::from([("a".to_string(), 1.0)]));
            assert_eq!(score_value(&detailed), x);
        }
    }
}
