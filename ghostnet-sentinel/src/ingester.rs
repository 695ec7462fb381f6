//! Event Ingester — turns on-chain activity into a stream of [`WalletEvent`]s.
//!
//! Prefers a push subscription via an optional [`DataStreamCollaborator`];
//! always falls back to polling the chain directly. Delivery is at-least
//! once; deduplication against a per-wallet and global LRU of transaction
//! hashes is this module's responsibility.

use std::num::NonZeroUsize;
use std::sync::Arc;

use alloy::primitives::TxHash;
use dashmap::DashMap;
use lru::LruCache;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use evm_provider::ChainProvider;

use crate::chain::ChainClient;
use crate::codec;
use crate::data_stream::{decode_push_payload, DataStreamCollaborator};
use crate::error::Result;
use crate::types::{EventKind, TxStatus, WalletEvent};

/// Width of the block window the pull-fallback scans on every tick.
pub const LOOKBACK: u64 = 20;
/// Maximum events the historical bootstrap will collect per wallet.
pub const N_BOOTSTRAP: usize = 20;
/// Upper bound on how many blocks the historical bootstrap will scan.
pub const MAX_BOOTSTRAP_BLOCKS: u64 = 10_000;
/// Per-wallet dedup cache capacity.
pub const PER_WALLET_DEDUP_CAP: usize = 1000;
/// Approximate global dedup cache capacity across all wallets.
pub const GLOBAL_DEDUP_CAP: usize = 10_000;

/// Result of resolving one transaction hash against a wallet.
#[derive(Debug)]
enum FetchOutcome {
    /// The transaction doesn't exist (yet) or doesn't touch the wallet.
    NotRelevant,
    /// The transaction touches the wallet but its receipt or block isn't
    /// available yet; must not be marked as dedup-seen.
    Pending,
    /// Resolved into a full event.
    Event(WalletEvent),
}

fn canonical_address(addr: alloy::primitives::Address) -> String {
    codec::normalize(&addr.to_string())
        .map(|(canonical, _)| canonical)
        .unwrap_or_else(|_| addr.to_string().to_lowercase())
}

/// Produces [`WalletEvent`]s for one or more monitored wallets, by push
/// subscription when available and by polling the chain otherwise.
pub struct Ingester<P> {
    chain: Arc<ChainClient<P>>,
    data_stream: Option<Arc<dyn DataStreamCollaborator>>,
    per_wallet_dedup: DashMap<String, AsyncMutex<LruCache<String, ()>>>,
    global_dedup: AsyncMutex<LruCache<String, ()>>,
}

impl<P> std::fmt::Debug for Ingester<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingester")
            .field("has_data_stream", &self.data_stream.is_some())
            .field("wallets_tracked", &self.per_wallet_dedup.len())
            .finish()
    }
}

impl<P: ChainProvider> Ingester<P> {
    /// Build an ingester over `chain`, optionally backed by a push collaborator.
    #[must_use]
    pub fn new(chain: Arc<ChainClient<P>>, data_stream: Option<Arc<dyn DataStreamCollaborator>>) -> Self {
        Self {
            chain,
            data_stream,
            per_wallet_dedup: DashMap::new(),
            global_dedup: AsyncMutex::new(LruCache::new(
                NonZeroUsize::new(GLOBAL_DEDUP_CAP).expect("constant is non-zero"),
            )),
        }
    }

    /// Whether a push collaborator is configured (preference order, §4.5).
    #[must_use]
    pub fn supports_push(&self) -> bool {
        self.data_stream.is_some()
    }

    /// The configured push collaborator, if any.
    #[must_use]
    pub fn data_stream(&self) -> Option<Arc<dyn DataStreamCollaborator>> {
        self.data_stream.clone()
    }

    /// Whether `hash` has already been marked seen for `wallet`, in either
    /// the per-wallet or the global dedup cache. Read-only: a pending
    /// transaction must be re-checked on every tick until it is resolved, so
    /// checking must not itself mark anything seen.
    async fn is_seen(&self, wallet: &str, hash: &str) -> bool {
        {
            let global = self.global_dedup.lock().await;
            if global.contains(hash) {
                return true;
            }
        }
        if let Some(per_wallet) = self.per_wallet_dedup.get(wallet) {
            let per_wallet_guard = per_wallet.lock().await;
            if per_wallet_guard.contains(hash) {
                return true;
            }
        }
        false
    }

    /// Record `hash` as seen for `wallet` in both the per-wallet and global
    /// dedup caches. Call only once a transaction's fate is resolved
    /// (synthesized into an event, or confirmed not to touch `wallet`) —
    /// never for a transaction whose receipt is still pending.
    async fn mark_seen(&self, wallet: &str, hash: &str) {
        let per_wallet = self
            .per_wallet_dedup
            .entry(wallet.to_string())
            .or_insert_with(|| {
                AsyncMutex::new(LruCache::new(
                    NonZeroUsize::new(PER_WALLET_DEDUP_CAP).expect("constant is non-zero"),
                ))
            });
        per_wallet.lock().await.put(hash.to_string(), ());
        drop(per_wallet);

        let mut global = self.global_dedup.lock().await;
        global.put(hash.to_string(), ());
    }

    /// Drop all dedup state for `wallet` (called on `stop_monitor`).
    pub fn forget(&self, wallet: &str) {
        self.per_wallet_dedup.remove(wallet);
    }

    /// Fetch a transaction and its receipt and synthesize a [`WalletEvent`],
    /// if the transaction touches `wallet` and its receipt is available.
    ///
    /// Distinguishes [`FetchOutcome::NotRelevant`] (the transaction doesn't
    /// exist or doesn't involve `wallet` — safe to mark seen and never look
    /// at again) from [`FetchOutcome::Pending`] (the transaction does or may
    /// involve `wallet` but its receipt or block isn't available yet — must
    /// NOT be marked seen, so a later tick retries it, per §4.4's "a null
    /// receipt is pending, not an error").
    async fn fetch_event_for_tx(&self, wallet: &str, hash: TxHash) -> Result<FetchOutcome> {
        let Some(tx) = self.chain.get_transaction(hash).await? else {
            return Ok(FetchOutcome::NotRelevant);
        };

        let sender = canonical_address(tx.from);
        let receiver = tx.to.map(canonical_address);
        if sender != wallet && receiver.as_deref() != Some(wallet) {
            return Ok(FetchOutcome::NotRelevant);
        }

        let Some(receipt) = self.chain.get_transaction_receipt(hash).await? else {
            return Ok(FetchOutcome::Pending);
        };

        let Some(block) = self.chain.get_block(receipt.block_number, false).await? else {
            return Ok(FetchOutcome::Pending);
        };

        let kind = if tx.input.is_empty() {
            EventKind::Transfer
        } else {
            EventKind::ContractCall
        };

        Ok(FetchOutcome::Event(WalletEvent {
            kind,
            hash: hash.to_string(),
            sender,
            receiver,
            value: tx.value,
            block_height: receipt.block_number,
            block_timestamp_ms: block.timestamp * 1000,
            gas_price: alloy::primitives::U256::from(tx.gas_price),
            gas_used: receipt.gas_used,
            status: if receipt.success {
                TxStatus::Success
            } else {
                TxStatus::Failed
            },
            input: tx.input.to_vec(),
            contract_address: receipt.contract_address.map(canonical_address),
            token_symbol: None,
            token_value: None,
            method_selector: method_selector(&tx.input),
            nonce: tx.nonce,
            log_index: None,
        }))
    }

    /// One pull-fallback tick: scan `[max(1, latest - LOOKBACK), latest]` for
    /// unprocessed transactions touching `wallet`, in block-number order.
    pub async fn poll_tick(&self, wallet: &str) -> Result<Vec<WalletEvent>> {
        let latest = self.chain.get_block_number().await?;
        let from = latest.saturating_sub(LOOKBACK).max(1);
        self.scan_range(wallet, from, latest, usize::MAX).await
    }

    /// Historical bootstrap on first subscribe: best-effort, bounded scan
    /// collecting at most [`N_BOOTSTRAP`] recent events.
    pub async fn bootstrap(&self, wallet: &str) -> Result<Vec<WalletEvent>> {
        let latest = self.chain.get_block_number().await?;
        let from = latest.saturating_sub(MAX_BOOTSTRAP_BLOCKS).max(1);
        self.scan_range(wallet, from, latest, N_BOOTSTRAP).await
    }

    async fn scan_range(
        &self,
        wallet: &str,
        from: u64,
        to: u64,
        limit: usize,
    ) -> Result<Vec<WalletEvent>> {
        let mut events = Vec::new();
        for number in from..=to {
            let Some(block) = self.chain.get_block(number, true).await? else {
                continue;
            };
            for hash in block.transactions {
                if events.len() >= limit {
                    return Ok(events);
                }
                let hash_str = hash.to_string();
                if self.is_seen(wallet, &hash_str).await {
                    continue;
                }
                match self.fetch_event_for_tx(wallet, hash).await? {
                    FetchOutcome::Event(event) => {
                        self.mark_seen(wallet, &hash_str).await;
                        events.push(event);
                    }
                    FetchOutcome::NotRelevant => {
                        self.mark_seen(wallet, &hash_str).await;
                    }
                    FetchOutcome::Pending => {
                        // Left unseen: a later scan window picks the tx back
                        // up once its receipt lands.
                    }
                }
            }
        }
        events.sort_by_key(|event| event.block_height);
        Ok(events)
    }

    /// Handle one payload delivered by the push collaborator: tolerantly
    /// decode it into individual records, resolve each to a full
    /// [`WalletEvent`] via the chain client, and return them in block order.
    pub async fn handle_push_payload(&self, wallet: &str, payload: &Value) -> Result<Vec<WalletEvent>> {
        let mut events = Vec::new();
        for record in decode_push_payload(payload) {
            let Some(hash_str) = extract_tx_hash(&record) else {
                continue;
            };
            let Ok(hash) = hash_str.parse::<TxHash>() else {
                continue;
            };
            if self.is_seen(wallet, &hash_str).await {
                continue;
            }
            match self.fetch_event_for_tx(wallet, hash).await? {
                FetchOutcome::Event(event) => {
                    self.mark_seen(wallet, &hash_str).await;
                    events.push(event);
                }
                FetchOutcome::NotRelevant => {
                    self.mark_seen(wallet, &hash_str).await;
                }
                FetchOutcome::Pending => {
                    // Left unseen: push delivery can outrun receipt
                    // availability; a later poll tick or push delivery
                    // retries this hash.
                }
            }
        }
        events.sort_by_key(|event| event.block_height);
        Ok(events)
    }
}

fn method_selector(input: &alloy::primitives::Bytes) -> Option<[u8; 4]> {
    if input.len() < 4 {
        return None;
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&input[..4]);
    Some(selector)
}

/// Try the handful of key names a push payload's transaction-hash field is
/// documented to appear under.
fn extract_tx_hash(record: &Value) -> Option<String> {
    for key in ["transactionHash", "hash", "txHash"] {
        if let Some(value) = record.get(key).and_then(Value::as_str) {
            return Some(value.to_string());
        }
    }
    None
}
