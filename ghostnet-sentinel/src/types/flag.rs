//! `WalletFlag` — on-chain record of a critical classification.

use serde::{Deserialize, Serialize};

use super::enums::RiskLevel;

/// A record of a critical-risk classification written to, or read from, the
/// Flag Registry contract.
///
/// Created by the Flag Registry Client's write path; read back by the
/// Coordinator before any new flag to avoid duplicates. Implicitly expires
/// once `now > expires_at_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletFlag {
    /// Canonical wallet address.
    pub wallet: String,
    /// Whether the flag is currently considered active by the contract.
    pub is_flagged: bool,
    /// Risk level recorded at flag time.
    pub risk_level: RiskLevel,
    /// Reputation score recorded at flag time.
    pub reputation_score: f64,
    /// When the flag was written, milliseconds since epoch.
    pub flagged_at_ms: u64,
    /// When the flag expires, milliseconds since epoch.
    pub expires_at_ms: u64,
    /// Address of the signer that wrote the flag.
    pub flagger: String,
    /// Human-readable reason supplied at flag time.
    pub reason: String,
    /// Hash of the transaction that wrote this flag.
    pub tx_hash: String,
}

impl WalletFlag {
    /// Whether this flag is still in effect at the given time.
    #[must_use]
    pub fn is_active_at(&self, now_ms: u64) -> bool {
        self.is_flagged && now_ms <= self.expires_at_ms
    }
}
