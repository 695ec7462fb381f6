//! Standard EVM provider implementation using alloy.
//!
//! This module provides [`StandardEvmProvider`], a concrete implementation of
//! [`ChainProvider`] that works with any standard EVM chain using alloy's
//! HTTP transport.
//!
//! # Example
//!
//! ```ignore
//! use evm_provider::{StandardEvmProvider, ChainProvider};
//!
//! // Connect to any EVM chain
//! let provider = StandardEvmProvider::new("https://eth.llamarpc.com").await?;
//!
//! // Use chain-agnostic interface
//! let balance = provider.get_balance(address).await?;
//! let nonce = provider.get_nonce(address).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{BlockNumberOrTag, Filter, TransactionRequest as AlloyTxRequest};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::error::{ProviderError, Result};
use crate::traits::ChainProvider;
use crate::types::{
    BlockInfo, FeeData, LogFilter, TransactionInfo, TransactionReceipt, TransactionRequest,
};

// ═══════════════════════════════════════════════════════════════════════════════
// STANDARD EVM PROVIDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Standard EVM provider for chains without special features.
///
/// This provider uses alloy's HTTP transport and implements the full
/// [`ChainProvider`] trait for any standard EVM chain.
///
/// # Example
///
/// ```ignore
/// use evm_provider::StandardEvmProvider;
///
/// // Connect to Ethereum mainnet
/// let provider = StandardEvmProvider::new("https://eth.llamarpc.com").await?;
/// println!("Connected to chain {}", provider.chain_id());
///
/// // Connect with custom timeout
/// let provider = StandardEvmProvider::with_timeout(
///     "https://eth.llamarpc.com",
///     Duration::from_secs(60),
/// ).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StandardEvmProvider {
    /// The underlying alloy provider.
    provider: Arc<RootProvider<Ethereum>>,
    /// Cached chain ID for fast access.
    chain_id: u64,
    /// Timeout for receipt polling.
    receipt_poll_interval: Duration,
}

impl StandardEvmProvider {
    /// Create a new provider connected to the given RPC URL.
    ///
    /// This will query the chain ID from the remote node.
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - The HTTP RPC endpoint URL
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is invalid
    /// - Connection to the RPC endpoint fails
    /// - Chain ID query fails
    pub async fn new(rpc_url: &str) -> Result<Self> {
        Self::with_timeout(rpc_url, Duration::from_secs(30)).await
    }

    /// Create a new provider with a custom timeout.
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - The HTTP RPC endpoint URL
    /// * `timeout` - Request timeout duration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is invalid
    /// - The HTTP client cannot be built
    /// - Connection to the RPC endpoint fails
    /// - Chain ID query fails
    pub async fn with_timeout(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| ProviderError::InvalidConfig(format!("invalid RPC URL: {e}")))?;

        // Build HTTP client with timeout
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Connection(format!("failed to build HTTP client: {e}")))?;

        // Use ProviderBuilder with custom reqwest client
        // Note: ProviderBuilder::default() has no fillers enabled, which is what we want
        // for a raw provider (we manage nonces externally via NonceManager)
        let provider = ProviderBuilder::default().connect_reqwest(client, url);

        // Query chain ID
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ProviderError::Connection(format!("failed to get chain ID: {e}")))?;

        debug!(chain_id, rpc_url, "Connected to EVM chain");

        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
            receipt_poll_interval: Duration::from_millis(500),
        })
    }

    /// Set the polling interval for receipt queries.
    ///
    /// Default is 500ms. Increase for busy chains or to reduce RPC load.
    #[must_use]
    pub const fn with_receipt_poll_interval(mut self, interval: Duration) -> Self {
        self.receipt_poll_interval = interval;
        self
    }

    /// Get a reference to the underlying alloy provider.
    ///
    /// Use this for operations not covered by the [`ChainProvider`] trait.
    pub fn inner(&self) -> &RootProvider<Ethereum> {
        &self.provider
    }

    /// Convert our `TransactionRequest` to alloy's format.
    fn to_alloy_request(tx: &TransactionRequest) -> AlloyTxRequest {
        let mut req = AlloyTxRequest::default();

        if let Some(from) = tx.from {
            req = req.from(from);
        }
        if let Some(to) = tx.to {
            req = req.to(to);
        }
        if let Some(value) = tx.value {
            req = req.value(value);
        }
        if let Some(ref data) = tx.data {
            req = req.input(data.clone().into());
        }
        if let Some(gas_limit) = tx.gas_limit {
            req = req.gas_limit(gas_limit);
        }
        if let Some(gas_price) = tx.gas_price {
            req = req.gas_price(gas_price);
        }
        if let Some(nonce) = tx.nonce {
            req = req.nonce(nonce);
        }
        if let Some(chain_id) = tx.chain_id {
            req.set_chain_id(chain_id);
        }

        req
    }

    /// Convert our `LogFilter` to alloy's `Filter`.
    fn to_alloy_filter(filter: &LogFilter) -> Filter {
        let mut f = Filter::new();

        if let Some(from) = filter.from_block {
            f = f.from_block(from);
        }
        if let Some(to) = filter.to_block {
            f = f.to_block(to);
        }
        if !filter.addresses.is_empty() {
            f = f.address(filter.addresses.clone());
        }
        for (position, topic) in filter.topics.iter().enumerate() {
            if let Some(topic) = topic {
                f = match position {
                    0 => f.event_signature(*topic),
                    1 => f.topic1(*topic),
                    2 => f.topic2(*topic),
                    3 => f.topic3(*topic),
                    _ => f,
                };
            }
        }

        f
    }

    /// Convert an alloy block (transaction hashes only) to our format.
    fn from_alloy_block(block: alloy::rpc::types::Block) -> BlockInfo {
        BlockInfo {
            number: block.header.number,
            hash: block.header.hash,
            parent_hash: block.header.parent_hash,
            timestamp: block.header.timestamp,
            transactions: block.transactions.hashes().collect(),
        }
    }

    /// Convert an alloy transaction to our format.
    fn from_alloy_transaction(tx: alloy::rpc::types::Transaction) -> TransactionInfo {
        TransactionInfo {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            input: tx.input.clone(),
            nonce: tx.nonce,
            gas_price: tx.gas_price.unwrap_or_default(),
            block_number: tx.block_number,
            transaction_index: tx.transaction_index,
        }
    }

    /// Convert alloy receipt to our format.
    fn from_alloy_receipt(
        receipt: &alloy::rpc::types::TransactionReceipt,
    ) -> Result<TransactionReceipt> {
        Ok(TransactionReceipt {
            tx_hash: receipt.transaction_hash,
            block_hash: receipt
                .block_hash
                .ok_or_else(|| ProviderError::InvalidResponse("missing block_hash".into()))?,
            block_number: receipt
                .block_number
                .ok_or_else(|| ProviderError::InvalidResponse("missing block_number".into()))?,
            tx_index: receipt.transaction_index.unwrap_or(0),
            from: receipt.from,
            to: receipt.to,
            contract_address: receipt.contract_address,
            gas_used: receipt.gas_used,
            success: receipt.status(),
            logs: receipt.inner.logs().to_vec(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN PROVIDER IMPLEMENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl ChainProvider for StandardEvmProvider {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_pending_nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .block_id(BlockNumberOrTag::Pending.into())
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self, tx), fields(chain_id = self.chain_id))]
    async fn send_raw_transaction(&self, tx: Bytes) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(&tx)
            .await
            .map_err(ProviderError::from)?;

        Ok(*pending.tx_hash())
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<TransactionReceipt> {
        let start = std::time::Instant::now();

        loop {
            // Check timeout
            if start.elapsed() > timeout {
                return Err(ProviderError::ReceiptNotFound(tx_hash));
            }

            // Try to get receipt
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    return Self::from_alloy_receipt(&receipt);
                }
                Ok(None) => {
                    // Not yet mined, wait and retry
                    tokio::time::sleep(self.receipt_poll_interval).await;
                }
                Err(e) => {
                    warn!(
                        tx_hash = %tx_hash,
                        error = %e,
                        "Error fetching receipt, will retry"
                    );
                    tokio::time::sleep(self.receipt_poll_interval).await;
                }
            }
        }
    }

    #[instrument(skip(self, tx), fields(chain_id = self.chain_id))]
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        let alloy_tx = Self::to_alloy_request(tx);

        self.provider
            .estimate_gas(alloy_tx)
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self, tx), fields(chain_id = self.chain_id))]
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        let alloy_tx = Self::to_alloy_request(tx);

        self.provider
            .call(alloy_tx)
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_block_number(&self) -> Result<u64> {
        self.provider.get_block_number().await.map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_block(&self, number: u64, full: bool) -> Result<Option<BlockInfo>> {
        let kind = if full {
            alloy::rpc::types::BlockTransactionsKind::Full
        } else {
            alloy::rpc::types::BlockTransactionsKind::Hashes
        };

        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .kind(kind)
            .await
            .map_err(ProviderError::from)?;

        Ok(block.map(Self::from_alloy_block))
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_transaction(&self, hash: TxHash) -> Result<Option<TransactionInfo>> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(ProviderError::from)?;

        Ok(tx.map(Self::from_alloy_transaction))
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_transaction_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(ProviderError::from)?;

        receipt.map(|r| Self::from_alloy_receipt(&r)).transpose()
    }

    #[instrument(skip(self, filter), fields(chain_id = self.chain_id))]
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<alloy::rpc::types::Log>> {
        let alloy_filter = Self::to_alloy_filter(filter);

        self.provider
            .get_logs(&alloy_filter)
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_code(&self, address: Address) -> Result<Bytes> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(ProviderError::from)
    }

    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    async fn get_fee_data(&self) -> Result<FeeData> {
        let gas_price = self.provider.get_gas_price().await.map_err(ProviderError::from)?;

        match self.provider.estimate_eip1559_fees().await {
            Ok(estimate) => Ok(FeeData {
                gas_price,
                max_fee_per_gas: Some(estimate.max_fee_per_gas),
                max_priority_fee_per_gas: Some(estimate.max_priority_fee_per_gas),
            }),
            Err(e) => {
                debug!(error = %e, "chain does not support eip1559 fee estimation, using legacy gas price");
                Ok(FeeData { gas_price, max_fee_per_gas: None, max_priority_fee_per_gas: None })
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
