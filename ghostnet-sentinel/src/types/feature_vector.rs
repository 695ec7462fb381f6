//! `FeatureVector` — fixed-length numeric summary of a wallet's activity.

use serde::{Deserialize, Serialize};

/// A deterministic, fixed-length numeric summary of a wallet's event
/// history, produced by the Feature Extractor and consumed by the Scoring
/// Engine.
///
/// Graph features (`clustering_coefficient`, `page_rank`) always default to
/// `0.0`: they need the full counterparty graph, which is out of reach of a
/// single wallet's event buffer. The fields exist for forward compatibility
/// with a future graph-aware extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Total number of events considered.
    pub tx_count: f64,
    /// `tx_count` divided by the account's age in days.
    pub tx_per_day: f64,
    /// Mean native value across successful events.
    pub avg_value: f64,
    /// Minimum native value across successful events.
    pub min_value: f64,
    /// Maximum native value across successful events.
    pub max_value: f64,
    /// Days since the oldest observed event.
    pub account_age_days: f64,
    /// Days since the most recent observed event.
    pub days_since_last_tx: f64,
    /// Distinct calendar days with at least one event.
    pub active_days: f64,
    /// Distinct counterparty addresses, excluding the wallet itself.
    pub unique_counterparties: f64,
    /// Events that look like contract interactions.
    pub contract_interactions: f64,
    /// Events whose receipt reported failure.
    pub failed_tx_count: f64,
    /// A coarse gas-usage signal (mean gas used across successful events).
    pub gas_usage_pattern: f64,
    /// Sum of native value across successful events.
    pub total_volume: f64,
    /// Current native balance, if a balance query was available.
    pub balance: f64,
    /// Mean gas price across successful events.
    pub average_gas_price: f64,
    /// `avg_value / max_value`, in `[0, 1]`; 0 when `max_value` is 0.
    pub value_concentration: f64,
    /// Entropy of the hour-of-day histogram, normalized to `[0, 1]`.
    pub time_distribution: f64,
    /// `1 - var(inter_event_interval) / mean(inter_event_interval)^2`, clamped to `[0, 1]`.
    pub activity_consistency: f64,
    /// Reserved for a future graph-aware extractor. Always `0.0` here.
    pub clustering_coefficient: f64,
    /// Reserved for a future graph-aware extractor. Always `0.0` here.
    pub page_rank: f64,
}

impl FeatureVector {
    /// A feature vector for a wallet with no observed activity.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            tx_count: 0.0,
            tx_per_day: 0.0,
            avg_value: 0.0,
            min_value: 0.0,
            max_value: 0.0,
            account_age_days: 0.0,
            days_since_last_tx: 365.0,
            active_days: 0.0,
            unique_counterparties: 0.0,
            contract_interactions: 0.0,
            failed_tx_count: 0.0,
            gas_usage_pattern: 0.0,
            total_volume: 0.0,
            balance: 0.0,
            average_gas_price: 0.0,
            value_concentration: 0.0,
            time_distribution: 0.0,
            activity_consistency: 0.0,
            clustering_coefficient: 0.0,
            page_rank: 0.0,
        }
    }

    /// Look up a feature by the model's declared name. Unknown names default
    /// to `0.0` rather than erroring, per the model-input mapping step.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> f64 {
        match name {
            "tx_count" => self.tx_count,
            "tx_per_day" => self.tx_per_day,
            "avg_value" => self.avg_value,
            "min_value" => self.min_value,
            "max_value" => self.max_value,
            "account_age_days" => self.account_age_days,
            "days_since_last_tx" => self.days_since_last_tx,
            "active_days" => self.active_days,
            "unique_counterparties" => self.unique_counterparties,
            "contract_interactions" => self.contract_interactions,
            "failed_tx_count" => self.failed_tx_count,
            "gas_usage_pattern" => self.gas_usage_pattern,
            "total_volume" => self.total_volume,
            "balance" => self.balance,
            "average_gas_price" => self.average_gas_price,
            "value_concentration" => self.value_concentration,
            "time_distribution" => self.time_distribution,
            "activity_consistency" => self.activity_consistency,
            "clustering_coefficient" => self.clustering_coefficient,
            "page_rank" => self.page_rank,
            _ => 0.0,
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::empty()
    }
}
