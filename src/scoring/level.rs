// src/scoring/level.rs - Composite score classification
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classifies a composite score using inclusive lower bounds: a score
    /// sitting exactly on a boundary (e.g. `0.7`) falls into the higher
    /// class.
    pub fn classify(composite_score: f64) -> Self {
        if composite_score >= 0.9 {
            RiskLevel::Critical
        } else if composite_score >= 0.7 {
            RiskLevel::High
        } else if composite_score >= 0.4 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn requires_alert(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_fall_to_the_higher_class() {
        assert_eq!(RiskLevel::classify(0.9), RiskLevel::Critical);
        assert_eq!(RiskLevel::classify(0.7), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.4), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(0.399_999), RiskLevel::Low);
    }
}
