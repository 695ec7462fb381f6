//! `WalletMonitor` — state for one actively monitored wallet.

use serde::{Deserialize, Serialize};

use super::scoring::ScoringResult;

/// Ingestion configuration for a single monitored wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Whether plain native-value transfers are ingested.
    pub include_native_transfers: bool,
    /// Whether ERC20-style token transfers are ingested.
    pub include_token_transfers: bool,
    /// Whether internal (trace-level) transfers are ingested.
    pub include_internal: bool,
    /// Block to start scanning from, if the caller wants history bounded.
    pub start_block: Option<u64>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            include_native_transfers: true,
            include_token_transfers: true,
            include_internal: false,
            start_block: None,
        }
    }
}

/// Process-local state attached to one subscribed wallet.
///
/// Created by the Coordinator on `subscribe`, destroyed on `unsubscribe` or
/// after a fatal ingestion failure (retry budget exhausted). The monitor is
/// registered with exactly one upstream subscription (push or poll) iff
/// `active` is `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletMonitor {
    /// Checksummed address, for display.
    pub address_checksummed: String,
    /// Canonical (lowercase) address, the map key.
    pub address_canonical: String,
    /// When this monitor was created, milliseconds since epoch.
    pub started_at_ms: u64,
    /// Last time an event was observed for this wallet, milliseconds since epoch.
    pub last_activity_ms: u64,
    /// Total events observed since the monitor was created.
    pub event_count: u64,
    /// The most recently computed score, if any.
    pub last_score: Option<ScoringResult>,
    /// Whether an ingestion task is currently attached to this wallet.
    pub active: bool,
    /// Ingestion preferences for this wallet.
    pub config: IngestionConfig,
}

impl WalletMonitor {
    /// Create a freshly-subscribed monitor.
    #[must_use]
    pub fn new(
        address_canonical: String,
        address_checksummed: String,
        now_ms: u64,
        config: IngestionConfig,
    ) -> Self {
        Self {
            address_checksummed,
            address_canonical,
            started_at_ms: now_ms,
            last_activity_ms: now_ms,
            event_count: 0,
            last_score: None,
            active: true,
            config,
        }
    }

    /// Record that an event was just observed.
    pub fn record_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
        self.event_count += 1;
    }
}
