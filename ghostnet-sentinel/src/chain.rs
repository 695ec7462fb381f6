//! Chain Client — a thin, retrying wrapper over a [`ChainProvider`].
//!
//! Every call is retried with exponential backoff when the underlying
//! provider classifies the failure as retryable; everything else propagates
//! immediately. A `None` receipt is treated as "pending", never as an error.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::Log;
use evm_provider::{
    BlockInfo, ChainProvider, FeeData, LogFilter, ProviderError, TransactionInfo,
    TransactionReceipt, TransactionRequest,
};

use crate::config::ChainSettings;
use crate::error::{AppError, InfraError};

/// Thin, retrying wrapper over a [`ChainProvider`].
///
/// Holds no state of its own beyond the retry policy; all chain state lives
/// behind the wrapped provider.
#[derive(Debug, Clone)]
pub struct ChainClient<P> {
    provider: Arc<P>,
    max_attempts: u32,
    retry_base: Duration,
    retry_max_delay: Duration,
}

impl<P: ChainProvider> ChainClient<P> {
    /// Wrap `provider`, taking retry policy from `settings`.
    pub fn new(provider: Arc<P>, settings: &ChainSettings) -> Self {
        Self {
            provider,
            max_attempts: settings.max_attempts,
            retry_base: settings.retry_base(),
            retry_max_delay: settings.retry_max_delay(),
        }
    }

    /// The wrapped provider, for collaborators (e.g. the nonce manager) that
    /// need direct access.
    #[must_use]
    pub fn provider(&self) -> Arc<P> {
        Arc::clone(&self.provider)
    }

    async fn with_retry<T, F, Fut>(&self, op: &str, mut f: F) -> crate::error::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.retry_base * 2u32.saturating_pow(attempt - 1);
                    let delay = delay.min(self.retry_max_delay);
                    tracing::warn!(
                        op,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        delay_ms = delay.as_millis(),
                        "retrying chain call"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(AppError::Infra(InfraError::Rpc(Box::new(err))));
                }
            }
        }
    }

    /// Latest block number.
    pub async fn get_block_number(&self) -> crate::error::Result<u64> {
        self.with_retry("get_block_number", || self.provider.get_block_number())
            .await
    }

    /// Fetch a block by number.
    pub async fn get_block(
        &self,
        number: u64,
        full: bool,
    ) -> crate::error::Result<Option<BlockInfo>> {
        self.with_retry("get_block", || self.provider.get_block(number, full))
            .await
    }

    /// Fetch a transaction by hash.
    pub async fn get_transaction(
        &self,
        hash: TxHash,
    ) -> crate::error::Result<Option<TransactionInfo>> {
        self.with_retry("get_transaction", || self.provider.get_transaction(hash))
            .await
    }

    /// Fetch a transaction's receipt. `None` means the transaction is still
    /// pending, not that the call failed.
    pub async fn get_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> crate::error::Result<Option<TransactionReceipt>> {
        self.with_retry("get_transaction_receipt", || {
            self.provider.get_transaction_receipt(hash)
        })
        .await
    }

    /// Fetch logs matching `filter`.
    pub async fn get_logs(&self, filter: &LogFilter) -> crate::error::Result<Vec<Log>> {
        self.with_retry("get_logs", || self.provider.get_logs(filter))
            .await
    }

    /// Native balance of `address`.
    pub async fn get_balance(&self, address: Address) -> crate::error::Result<U256> {
        self.with_retry("get_balance", || self.provider.get_balance(address))
            .await
    }

    /// Confirmed transaction count (nonce) of `address`.
    pub async fn get_transaction_count(&self, address: Address) -> crate::error::Result<u64> {
        self.with_retry("get_transaction_count", || {
            self.provider.get_transaction_count(address)
        })
        .await
    }

    /// Deployed bytecode at `address`, empty if it's an EOA.
    pub async fn get_code(&self, address: Address) -> crate::error::Result<Bytes> {
        self.with_retry("get_code", || self.provider.get_code(address))
            .await
    }

    /// Estimate the gas a transaction would consume.
    pub async fn estimate_gas(&self, request: &TransactionRequest) -> crate::error::Result<u64> {
        self.with_retry("estimate_gas", || self.provider.estimate_gas(request))
            .await
    }

    /// Current fee data (legacy gas price, and EIP-1559 fields if available).
    pub async fn get_fee_data(&self) -> crate::error::Result<FeeData> {
        self.with_retry("get_fee_data", || self.provider.get_fee_data())
            .await
    }

    /// Execute a read-only call against the chain, returning raw return data.
    pub async fn call(&self, request: &TransactionRequest) -> crate::error::Result<Bytes> {
        self.with_retry("call", || self.provider.call(request)).await
    }

    /// Submit a raw signed transaction, returning its hash.
    pub async fn send_raw_transaction(&self, raw: Bytes) -> crate::error::Result<TxHash> {
        self.with_retry("send_raw_transaction", || {
            self.provider.send_raw_transaction(raw.clone())
        })
        .await
    }

    /// Poll for a transaction's receipt until it has at least `confirmations`
    /// blocks built on top of it, or `timeout` elapses.
    ///
    /// # Errors
    /// Returns [`InfraError::Timeout`] if the receipt never accumulates
    /// enough confirmations within `timeout`.
    pub async fn wait_for_tx(
        &self,
        hash: TxHash,
        confirmations: u64,
        timeout: Duration,
    ) -> crate::error::Result<TransactionReceipt> {
        let deadline = tokio::time::Instant::now() + timeout;

        let receipt = self
            .with_retry("wait_for_receipt", || {
                self.provider.wait_for_receipt(hash, timeout)
            })
            .await?;

        if confirmations <= 1 {
            return Ok(receipt);
        }

        loop {
            let latest = self.get_block_number().await?;
            let confirmed = latest.saturating_sub(receipt.block_number) + 1;
            if confirmed >= confirmations {
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AppError::Infra(InfraError::Timeout(format!(
                    "transaction {hash} did not reach {confirmations} confirmations within {timeout:?}"
                ))));
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    }
}
