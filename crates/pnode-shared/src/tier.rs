//! Tier and status classification for display.
//!
//! Every lookup here is total: vocabulary sent by the API that this client
//! does not know maps to a neutral fallback instead of an error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tier {
    LowRisk,
    MediumRisk,
    HighRisk,
    Legendary,
    Elite,
    Reliable,
    Standard,
    New,
    /// Any tag outside the known set, kept verbatim.
    Unknown(String),
}

impl Tier {
    pub const KNOWN: [Tier; 8] = [
        Tier::LowRisk,
        Tier::MediumRisk,
        Tier::HighRisk,
        Tier::Legendary,
        Tier::Elite,
        Tier::Reliable,
        Tier::Standard,
        Tier::New,
    ];

    pub fn parse(tag: &str) -> Self {
        match tag {
            "low_risk" => Tier::LowRisk,
            "medium_risk" => Tier::MediumRisk,
            "high_risk" => Tier::HighRisk,
            "legendary" => Tier::Legendary,
            "elite" => Tier::Elite,
            "reliable" => Tier::Reliable,
            "standard" => Tier::Standard,
            "new" => Tier::New,
            other => Tier::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Tier::LowRisk => "low_risk",
            Tier::MediumRisk => "medium_risk",
            Tier::HighRisk => "high_risk",
            Tier::Legendary => "legendary",
            Tier::Elite => "elite",
            Tier::Reliable => "reliable",
            Tier::Standard => "standard",
            Tier::New => "new",
            Tier::Unknown(tag) => tag,
        }
    }

    pub fn info(&self) -> TierInfo {
        let (emoji, label, style) = match self {
            Tier::LowRisk => ("🟢", "Low Risk", TierStyle::LowRisk),
            Tier::MediumRisk => ("🟡", "Medium Risk", TierStyle::MediumRisk),
            Tier::HighRisk => ("🔴", "High Risk", TierStyle::HighRisk),
            Tier::Legendary => ("🏆", "Legendary", TierStyle::Legendary),
            Tier::Elite => ("⭐", "Elite", TierStyle::Elite),
            Tier::Reliable => ("✓", "Reliable", TierStyle::Reliable),
            Tier::Standard => ("•", "Standard", TierStyle::Standard),
            Tier::New => ("🆕", "New", TierStyle::New),
            Tier::Unknown(_) => ("•", "Unknown", TierStyle::Neutral),
        };
        TierInfo { emoji, label, style }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tier::Unknown(_))
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Unknown(String::new())
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().label)
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null or a missing tier decodes like an unrecognised one
        let tag: Option<String> = Option::deserialize(deserializer)?;
        Ok(tag.as_deref().map(Tier::parse).unwrap_or_default())
    }
}

/// Display metadata for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierInfo {
    pub emoji: &'static str,
    pub label: &'static str,
    pub style: TierStyle,
}

/// Style category of a tier badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierStyle {
    LowRisk,
    MediumRisk,
    HighRisk,
    Legendary,
    Elite,
    Reliable,
    Standard,
    New,
    Neutral,
}

impl TierStyle {
    /// Stylesheet class; empty for the neutral style.
    pub fn class(&self) -> &'static str {
        match self {
            TierStyle::LowRisk => "tier-low-risk",
            TierStyle::MediumRisk => "tier-medium-risk",
            TierStyle::HighRisk => "tier-high-risk",
            TierStyle::Legendary => "tier-legendary",
            TierStyle::Elite => "tier-elite",
            TierStyle::Reliable => "tier-reliable",
            TierStyle::Standard => "tier-standard",
            TierStyle::New => "tier-new",
            TierStyle::Neutral => "",
        }
    }
}

/// Classify a raw tier tag. Never fails.
pub fn classify(tag: &str) -> TierInfo {
    Tier::parse(tag).info()
}

// ---------------------------------------------------------------------------
// Score bands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 90.0 {
            ScoreBand::Excellent
        } else if score >= 75.0 {
            ScoreBand::Good
        } else if score >= 50.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "score-excellent",
            ScoreBand::Good => "score-good",
            ScoreBand::Fair => "score-fair",
            ScoreBand::Poor => "score-poor",
        }
    }
}

// ---------------------------------------------------------------------------
// Network health status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Fair,
    Degraded,
    Critical,
    Unknown(String),
}

impl HealthStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "healthy" => HealthStatus::Healthy,
            "fair" => HealthStatus::Fair,
            "degraded" => HealthStatus::Degraded,
            "critical" => HealthStatus::Critical,
            other => HealthStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Fair => "fair",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Critical => "critical",
            HealthStatus::Unknown(s) => s,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "🟢",
            HealthStatus::Fair => "🟡",
            HealthStatus::Degraded => "🟠",
            HealthStatus::Critical => "🔴",
            HealthStatus::Unknown(_) => "⚪",
        }
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        HealthStatus::Unknown(String::new())
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HealthStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let status: Option<String> = Option::deserialize(deserializer)?;
        Ok(status.as_deref().map(HealthStatus::parse).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tiers_round_trip_tags() {
        for tier in Tier::KNOWN {
            assert_eq!(Tier::parse(tier.as_str()), tier);
            assert_ne!(tier.info().label, "Unknown");
            assert_ne!(tier.info().style, TierStyle::Neutral);
        }
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(classify("low_risk").label, "Low Risk");
        assert_eq!(classify("legendary").emoji, "🏆");
        assert_eq!(classify("elite").style.class(), "tier-elite");
    }

    #[test]
    fn test_unknown_tier_falls_back() {
        for tag in ["", "mythic", "LOW_RISK", "elite ", "🦀"] {
            let info = classify(tag);
            assert_eq!(info.label, "Unknown");
            assert_eq!(info.style, TierStyle::Neutral);
            assert_eq!(info.style.class(), "");
        }
    }

    #[test]
    fn test_tier_deserialize_tolerates_new_vocabulary() {
        let tier: Tier = serde_json::from_str("\"diamond\"").unwrap();
        assert_eq!(tier, Tier::Unknown("diamond".into()));
        assert_eq!(serde_json::to_string(&tier).unwrap(), "\"diamond\"");

        let tier: Tier = serde_json::from_str("null").unwrap();
        assert!(!tier.is_known());
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::of(95.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(90.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::of(75.0), ScoreBand::Good);
        assert_eq!(ScoreBand::of(50.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(49.9), ScoreBand::Poor);
        assert_eq!(ScoreBand::of(-1.0).class(), "score-poor");
    }

    #[test]
    fn test_health_status_fallback() {
        assert_eq!(HealthStatus::parse("degraded").emoji(), "🟠");
        assert_eq!(HealthStatus::parse("meltdown").emoji(), "⚪");
    }
}
