//! The Scoring Engine: orchestrates model inference, fallback, and flags.

use crate::config::ModelSettings;
use crate::types::{FeatureVector, RiskLevel, ScoringResult};

use super::artifacts::ModelArtifacts;
use super::rules::rule_based_fallback;

const HIGH_FAILURE_THRESHOLD: f64 = 10.0;
const HIGH_FREQUENCY_THRESHOLD: f64 = 50.0;
const MANY_COUNTERPARTIES_THRESHOLD: f64 = 500.0;
const NEW_ACCOUNT_AGE_DAYS: f64 = 7.0;
const HIGH_CONTRACT_ACTIVITY_THRESHOLD: f64 = 200.0;

/// Converts feature vectors into reputation scores, using a loaded
/// classifier when available and a deterministic rule-based fallback
/// otherwise.
#[derive(Debug)]
pub struct ScoringEngine {
    artifacts: ModelArtifacts,
}

impl ScoringEngine {
    /// Load model artifacts from the configured paths.
    #[must_use]
    pub fn load(settings: &ModelSettings) -> Self {
        Self {
            artifacts: ModelArtifacts::load(settings),
        }
    }

    /// Build an engine that always runs the rule-based fallback, for tests
    /// and for deployments with no model configured.
    #[must_use]
    pub fn fallback_only() -> Self {
        Self {
            artifacts: ModelArtifacts::empty(),
        }
    }

    #[must_use]
    pub fn is_model_loaded(&self) -> bool {
        self.artifacts.is_model_loaded()
    }

    /// Score one wallet's current feature vector.
    #[must_use]
    pub fn score(
        &self,
        wallet_canonical: &str,
        features: FeatureVector,
        event_count: usize,
        computed_at_secs: u64,
    ) -> ScoringResult {
        let blacklisted = self.artifacts.is_blacklisted(wallet_canonical);

        let (mut raw_score, confidence, used_model) = if self.artifacts.is_model_loaded() {
            let row = self.artifacts.mapped_row(&features);
            match self.artifacts.infer(&row) {
                Some(p) => (100.0 * p, p, true),
                None => {
                    let verdict = rule_based_fallback(&features, event_count);
                    (verdict.score, verdict.confidence, false)
                }
            }
        } else {
            let verdict = rule_based_fallback(&features, event_count);
            (verdict.score, verdict.confidence, false)
        };

        if blacklisted {
            raw_score -= 30.0;
        }
        let score = raw_score.clamp(0.0, 100.0);
        let risk_level = RiskLevel::from_score(score);

        let flags = build_flags(&features, blacklisted, risk_level);
        let explanation = explain(used_model, blacklisted, risk_level, score);

        ScoringResult {
            wallet: wallet_canonical.to_string(),
            reputation_score: score,
            risk_level,
            confidence,
            features,
            computed_at_secs,
            event_count,
            flags,
            explanation,
        }
    }
}

fn build_flags(features: &FeatureVector, blacklisted: bool, risk_level: RiskLevel) -> Vec<String> {
    let mut flags = Vec::new();
    if blacklisted {
        flags.push("blacklisted".to_string());
    }
    if features.failed_tx_count > HIGH_FAILURE_THRESHOLD {
        flags.push("high_failure_rate".to_string());
    }
    if features.tx_per_day > HIGH_FREQUENCY_THRESHOLD {
        flags.push("high_frequency".to_string());
    }
    if features.unique_counterparties > MANY_COUNTERPARTIES_THRESHOLD {
        flags.push("many_counterparties".to_string());
    }
    if features.account_age_days < NEW_ACCOUNT_AGE_DAYS {
        flags.push("new_account".to_string());
    }
    if features.contract_interactions > HIGH_CONTRACT_ACTIVITY_THRESHOLD {
        flags.push("high_contract_activity".to_string());
    }
    match risk_level {
        RiskLevel::Critical => flags.push("critical_risk".to_string()),
        RiskLevel::High => flags.push("high_risk".to_string()),
        RiskLevel::Medium | RiskLevel::Low => {}
    }
    flags
}

fn explain(used_model: bool, blacklisted: bool, risk_level: RiskLevel, score: f64) -> String {
    let source = if used_model { "model" } else { "rule-based fallback" };
    let suffix = if blacklisted { ", blacklist penalty applied" } else { "" };
    format!("{source} scored {score:.1} ({risk_level}){suffix}")
}
