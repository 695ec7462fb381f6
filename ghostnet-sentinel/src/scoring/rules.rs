//! Deterministic rule-based scoring, used whenever no model is loaded.

use crate::types::FeatureVector;

/// Raw score and confidence produced by the rule-based fallback, before the
/// universal blacklist penalty and clamp the engine applies to both paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleVerdict {
    /// Raw reputation score, not yet clamped to `[0, 100]`.
    pub score: f64,
    /// Confidence in `[0.3, 0.8]`, a proxy for how much history backs the score.
    pub confidence: f64,
}

/// Deterministic, monotonic-in-badness scoring used when the classifier is
/// unavailable. Starts from a neutral base of 70 and applies additive
/// adjustments for activity level, value, failure rate, and account age.
#[must_use]
pub fn rule_based_fallback(features: &FeatureVector, event_count: usize) -> RuleVerdict {
    let activity_bonus = ((1.0 + features.tx_count).log10() * 2.0).min(8.0);

    let high_frequency_penalty = ((features.tx_per_day - 50.0).max(0.0) * 0.3).min(25.0);

    let moderate_frequency_bonus = if features.tx_per_day > 0.0 && features.tx_per_day <= 10.0 {
        (features.tx_per_day * 0.3).min(5.0)
    } else {
        0.0
    };

    let high_value_penalty = (features.avg_value.max(1.0).log10() * 2.0).min(15.0);

    let failure_penalty = 4.0 * features.failed_tx_count;

    let age_adjustment = if features.account_age_days > 30.0 {
        (features.account_age_days.max(1.0).log10() * 3.0).min(15.0)
    } else if features.account_age_days < 1.0 {
        -20.0
    } else {
        0.0
    };

    let score = 70.0 + activity_bonus - high_frequency_penalty + moderate_frequency_bonus
        - high_value_penalty
        - failure_penalty
        + age_adjustment;

    let confidence = (0.05 * event_count as f64).min(0.8).max(0.3);

    RuleVerdict { score, confidence }
}
