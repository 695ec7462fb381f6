//! Pure feature computation plus the per-wallet history cache that feeds it.

use std::collections::{HashSet, VecDeque};

use alloy::primitives::U256;
use chrono::{DateTime, Timelike, Utc};
use dashmap::DashMap;

use crate::types::{FeatureVector, WalletEvent};

/// Newest events retained per wallet. Older events are evicted once a
/// wallet's history exceeds this length.
pub const MAX_HISTORY: usize = 1000;

/// Documented maxima that keep a long-lived wallet's raw counters from
/// swamping the scoring model.
const MAX_ACCOUNT_AGE_DAYS: f64 = 5.0 * 365.0;
const MAX_DAYS_SINCE_LAST_TX: f64 = 365.0;
const MAX_TX_COUNT: f64 = 10_000.0;

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}

/// Stateful wrapper around [`compute_features`] that keeps a capped,
/// newest-first event history per wallet so features stay comparable across
/// calls even after the Coordinator flushes its own short-lived buffer.
#[derive(Debug, Default)]
pub struct FeatureExtractor {
    histories: DashMap<String, VecDeque<WalletEvent>>,
}

impl FeatureExtractor {
    /// Create an extractor with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one newly observed event for `wallet`, evicting the oldest
    /// entry once history exceeds [`MAX_HISTORY`].
    pub fn ingest(&self, wallet: &str, event: WalletEvent) {
        let mut history = self.histories.entry(wallet.to_string()).or_default();
        history.push_front(event);
        while history.len() > MAX_HISTORY {
            history.pop_back();
        }
    }

    /// Record a batch of newly observed events, in the order given.
    pub fn ingest_many(&self, wallet: &str, events: impl IntoIterator<Item = WalletEvent>) {
        for event in events {
            self.ingest(wallet, event);
        }
    }

    /// Number of events currently retained for `wallet`.
    #[must_use]
    pub fn history_len(&self, wallet: &str) -> usize {
        self.histories.get(wallet).map_or(0, |h| h.len())
    }

    /// Extract a [`FeatureVector`] from everything currently retained for
    /// `wallet`, plus an optional current balance.
    #[must_use]
    pub fn extract(&self, wallet: &str, now_ms: u64, balance: Option<U256>) -> FeatureVector {
        match self.histories.get(wallet) {
            Some(history) => {
                let events: Vec<WalletEvent> = history.iter().cloned().collect();
                compute_features(&events, now_ms, balance.map(u256_to_f64))
            }
            None => {
                let mut empty = FeatureVector::empty();
                empty.balance = balance.map(u256_to_f64).unwrap_or(0.0);
                empty
            }
        }
    }

    /// Drop all retained history for `wallet`.
    pub fn forget(&self, wallet: &str) {
        self.histories.remove(wallet);
    }
}

/// Deterministically derive a [`FeatureVector`] from an event list.
///
/// `events` is expected newest-first, matching the order the Coordinator and
/// [`FeatureExtractor`] retain them in; this function does not re-sort by
/// itself and instead sorts a scratch copy where chronological order
/// matters.
#[must_use]
pub fn compute_features(events: &[WalletEvent], now_ms: u64, balance: Option<f64>) -> FeatureVector {
    let mut features = FeatureVector::empty();
    features.balance = balance.unwrap_or(0.0);

    if events.is_empty() {
        return features;
    }

    let now_secs = (now_ms / 1000) as f64;

    let mut chronological: Vec<&WalletEvent> = events.iter().collect();
    chronological.sort_by_key(|event| event.block_timestamp_secs());

    let oldest_secs = chronological
        .first()
        .expect("checked non-empty above")
        .block_timestamp_secs() as f64;
    let newest_secs = chronological
        .last()
        .expect("checked non-empty above")
        .block_timestamp_secs() as f64;

    features.tx_count = (events.len() as f64).min(MAX_TX_COUNT);
    features.account_age_days =
        ((now_secs - oldest_secs) / 86_400.0).max(0.0).min(MAX_ACCOUNT_AGE_DAYS);
    features.days_since_last_tx =
        ((now_secs - newest_secs) / 86_400.0).max(0.0).min(MAX_DAYS_SINCE_LAST_TX);
    features.tx_per_day = features.tx_count / features.account_age_days.max(1.0);

    let successful: Vec<&WalletEvent> = events.iter().filter(|e| e.contributes_value()).collect();
    features.failed_tx_count = (events.len() - successful.len()) as f64;

    if !successful.is_empty() {
        let values: Vec<f64> = successful.iter().map(|e| u256_to_f64(e.value)).collect();
        let sum: f64 = values.iter().sum();
        features.avg_value = sum / values.len() as f64;
        features.min_value = values.iter().cloned().fold(f64::INFINITY, f64::min);
        features.max_value = values.iter().cloned().fold(0.0, f64::max);
        features.total_volume = sum;
        features.value_concentration = if features.max_value > 0.0 {
            (features.avg_value / features.max_value).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let gas_used_sum: f64 = successful.iter().map(|e| e.gas_used as f64).sum();
        features.gas_usage_pattern = gas_used_sum / successful.len() as f64;

        let gas_price_sum: f64 = successful.iter().map(|e| u256_to_f64(e.gas_price)).sum();
        features.average_gas_price = gas_price_sum / successful.len() as f64;
    }

    let wallet = find_wallet(events);
    let mut days: HashSet<i64> = HashSet::new();
    let mut counterparties: HashSet<&str> = HashSet::new();
    let mut contract_interactions = 0.0;
    for event in events {
        days.insert(event.block_timestamp_secs() as i64 / 86_400);
        if event.sender != wallet {
            counterparties.insert(&event.sender);
        }
        if let Some(receiver) = &event.receiver {
            if receiver != wallet {
                counterparties.insert(receiver);
            }
        }
        if event.is_contract_interaction() {
            contract_interactions += 1.0;
        }
    }
    features.active_days = days.len() as f64;
    features.unique_counterparties = counterparties.len() as f64;
    features.contract_interactions = contract_interactions;

    features.time_distribution = hour_of_day_entropy(events);
    features.activity_consistency = activity_consistency(&chronological);

    features
}

/// Either party of an event can be "the wallet" depending on direction; the
/// feature computation only needs to exclude self-to-self edges from the
/// counterparty count, so we infer it from whichever address repeats most
/// often across the buffer rather than requiring callers to pass it in.
fn find_wallet(events: &[WalletEvent]) -> &str {
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for event in events {
        *counts.entry(event.sender.as_str()).or_insert(0) += 1;
        if let Some(receiver) = &event.receiver {
            *counts.entry(receiver.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(addr, _)| addr)
        .unwrap_or("")
}

fn hour_of_day_entropy(events: &[WalletEvent]) -> f64 {
    let mut buckets = [0u32; 24];
    for event in events {
        let secs = event.block_timestamp_secs() as i64;
        let Some(dt) = DateTime::<Utc>::from_timestamp(secs, 0) else {
            continue;
        };
        buckets[dt.hour() as usize] += 1;
    }
    let total: u32 = buckets.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let mut entropy = 0.0;
    for count in buckets {
        if count == 0 {
            continue;
        }
        let p = f64::from(count) / f64::from(total);
        entropy -= p * p.log2();
    }
    entropy / 24f64.log2()
}

fn activity_consistency(chronological: &[&WalletEvent]) -> f64 {
    if chronological.len() < 2 {
        return 0.0;
    }
    let intervals: Vec<f64> = chronological
        .windows(2)
        .map(|pair| (pair[1].block_timestamp_secs() - pair[0].block_timestamp_secs()) as f64)
        .collect();
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance =
        intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
    (1.0 - variance / mean.powi(2)).clamp(0.0, 1.0)
}
