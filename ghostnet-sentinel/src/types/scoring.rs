//! `ScoringResult` — the scored verdict for a wallet.

use serde::{Deserialize, Serialize};

use super::enums::RiskLevel;
use super::feature_vector::FeatureVector;

/// The output of the Scoring Engine for one wallet at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Canonical wallet address this result is for.
    pub wallet: String,
    /// Reputation score in `[0, 100]`, higher is safer.
    pub reputation_score: f64,
    /// Risk level, always derived from `reputation_score` by the §4.3 thresholds.
    pub risk_level: RiskLevel,
    /// Model confidence, or a data-availability proxy in fallback mode, in `[0, 1]`.
    pub confidence: f64,
    /// The feature vector this result was computed from.
    pub features: FeatureVector,
    /// When this result was computed, seconds since epoch.
    pub computed_at_secs: u64,
    /// Number of events folded into this computation.
    pub event_count: usize,
    /// Machine-checkable flags raised during scoring.
    pub flags: Vec<String>,
    /// A short human-readable explanation of the verdict.
    pub explanation: String,
}

impl ScoringResult {
    /// Whether this result differs *significantly* from a previous one:
    /// `|delta score| >= 5` or the risk level changed.
    #[must_use]
    pub fn is_significant_change_from(&self, previous: &Self) -> bool {
        (self.reputation_score - previous.reputation_score).abs() >= 5.0
            || self.risk_level != previous.risk_level
    }

    /// Whether this wallet meets the flagging trigger: `score < 40` and
    /// `risk_level == CRITICAL`.
    #[must_use]
    pub fn meets_flagging_threshold(&self) -> bool {
        self.reputation_score < 40.0 && self.risk_level == RiskLevel::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(score: f64, risk_level: RiskLevel) -> ScoringResult {
        ScoringResult {
            wallet: "0xabc".into(),
            reputation_score: score,
            risk_level,
            confidence: 0.5,
            features: FeatureVector::empty(),
            computed_at_secs: 0,
            event_count: 0,
            flags: vec![],
            explanation: String::new(),
        }
    }

    #[test]
    fn significant_change_on_large_score_delta() {
        let a = result_with(60.0, RiskLevel::Medium);
        let b = result_with(54.0, RiskLevel::Medium);
        assert!(b.is_significant_change_from(&a));
    }

    #[test]
    fn not_significant_on_small_score_delta() {
        let a = result_with(60.0, RiskLevel::Medium);
        let b = result_with(57.0, RiskLevel::Medium);
        assert!(!b.is_significant_change_from(&a));
    }

    #[test]
    fn significant_on_risk_level_change_with_small_delta() {
        let a = result_with(51.0, RiskLevel::Medium);
        let b = result_with(49.0, RiskLevel::High);
        assert!(b.is_significant_change_from(&a));
    }

    #[test]
    fn flagging_threshold_requires_both_conditions() {
        assert!(result_with(39.0, RiskLevel::Critical).meets_flagging_threshold());
        assert!(!result_with(39.0, RiskLevel::High).meets_flagging_threshold());
        assert!(!result_with(40.0, RiskLevel::Critical).meets_flagging_threshold());
    }
}
