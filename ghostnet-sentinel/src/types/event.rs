//! `WalletEvent` — one observed on-chain action involving a monitored wallet.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::enums::{EventKind, TxStatus};

/// One observed on-chain action touching a monitored wallet.
///
/// Created by the Event Ingester and appended to the Coordinator's per-wallet
/// ring buffer. Never mutated after creation. `hash` uniquely identifies the
/// event within the monitored set; for a monitored wallet `w`, at least one
/// of `sender == w`, `receiver == Some(w)` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEvent {
    /// What kind of action this was.
    pub kind: EventKind,
    /// 32-byte transaction hash, as `0x`-prefixed hex.
    pub hash: String,
    /// Sender address (canonical lowercase).
    pub sender: String,
    /// Receiver address (canonical lowercase), if any (contract creation has none).
    pub receiver: Option<String>,
    /// Native-token value moved, in minor units (wei).
    pub value: U256,
    /// Block height the transaction was included in.
    pub block_height: u64,
    /// Block timestamp, milliseconds since epoch UTC.
    pub block_timestamp_ms: u64,
    /// Effective gas price, in minor units.
    pub gas_price: U256,
    /// Gas actually used.
    pub gas_used: u64,
    /// Execution status from the receipt.
    pub status: TxStatus,
    /// Raw call input bytes; empty for plain transfers.
    pub input: Vec<u8>,
    /// Contract address, if the transaction targeted a contract.
    pub contract_address: Option<String>,
    /// Token symbol, for token-transfer events.
    pub token_symbol: Option<String>,
    /// Token value transferred, for token-transfer events.
    pub token_value: Option<U256>,
    /// The 4-byte method selector, if `input` is long enough to contain one.
    pub method_selector: Option<[u8; 4]>,
    /// Sender's account nonce at the time of this transaction.
    pub nonce: u64,
    /// Log index within the transaction.
    ///
    /// Treated as optional, non-sort-key metadata: the source this was
    /// distilled from sets it inconsistently across ingestion paths, so
    /// ordering relies on `block_height` plus the ingester's own observation
    /// order, not this field.
    pub log_index: Option<u64>,
}

impl WalletEvent {
    /// Whether this event counts toward value-based aggregates.
    ///
    /// Only successful events contribute; failed events only ever contribute
    /// to the failed-transaction count.
    #[must_use]
    pub fn contributes_value(&self) -> bool {
        self.status == TxStatus::Success
    }

    /// Whether this event looks like a contract interaction: either it
    /// carries an explicit contract address, or its input is longer than a
    /// bare method selector.
    #[must_use]
    pub fn is_contract_interaction(&self) -> bool {
        self.contract_address.is_some() || self.input.len() > 4
    }

    /// Block timestamp in seconds since epoch, for feature-extraction math
    /// that is naturally expressed in days.
    #[must_use]
    pub const fn block_timestamp_secs(&self) -> u64 {
        self.block_timestamp_ms / 1000
    }
}
