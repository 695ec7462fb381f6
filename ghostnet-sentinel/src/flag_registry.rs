//! Flag Registry Client — reads and writes the on-chain Flag Registry contract.

use std::str::FromStr;
use std::sync::Arc;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest as RpcTransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::SolCall;

use evm_provider::{ChainProvider, LocalNonceManager, NonceManager};

use crate::chain::ChainClient;
use crate::codec;
use crate::config::{ChainSettings, ContractSettings};
use crate::error::{AppError, DomainError, InfraError, Result};
use crate::types::{RiskLevel, WalletFlag};

sol! {
    #[sol(rpc)]
    interface IFlagRegistry {
        function flagWallet(address wallet, uint256 score, string reason) external;
        function unflagWallet(address wallet) external;
        function updateRiskLevel(address wallet, uint8 level) external;

        function isWalletFlagged(address wallet) external view returns (bool);
        function getWalletFlag(address wallet) external view returns (
            bool isFlagged,
            uint8 riskLevel,
            uint256 reputationScore,
            uint256 flaggedAt,
            uint256 expiresAt,
            address flagger,
            string reason
        );
        function getAllFlaggedWallets() external view returns (address[] memory);
        function getActiveFlaggedCount() external view returns (uint256);
    }

    /// Emitted when a wallet is flagged.
    #[derive(Debug)]
    event WalletFlagged(address indexed wallet, uint8 riskLevel, uint256 score);

    /// Emitted when a wallet's flag is cleared.
    #[derive(Debug)]
    event WalletUnflagged(address indexed wallet);

    /// Emitted when a flagged wallet's risk level changes.
    #[derive(Debug)]
    event RiskLevelUpdated(address indexed wallet, uint8 newRiskLevel);
}

/// Outcome of a Flag Registry write operation.
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Whether the write succeeded (including the idempotent
    /// "already flagged"/"not flagged" cases).
    pub ok: bool,
    /// Hash of the submitted transaction, if one was actually sent.
    pub tx_hash: Option<String>,
    /// Human-readable detail, set on both success and failure.
    pub error: Option<String>,
}

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::MAX)
}

fn parse_address(canonical: &str) -> Result<Address> {
    Address::from_str(canonical)
        .map_err(|err| AppError::Domain(DomainError::InvalidAddress(err.to_string())))
}

/// Reads and writes the on-chain Flag Registry contract.
///
/// Read operations are always available once a contract address is
/// configured. Write operations additionally require a signer
/// (`PRIVATE_KEY`); the client owns a per-signer nonce cache so writes don't
/// re-query the chain for every submission.
pub struct FlagRegistryClient<P: ChainProvider> {
    chain: Arc<ChainClient<P>>,
    contract: Address,
    confirmations: u64,
    gas_limit_fallback: u64,
    signer: Option<PrivateKeySigner>,
    nonce_manager: Option<LocalNonceManager<P>>,
}

impl<P: ChainProvider> std::fmt::Debug for FlagRegistryClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagRegistryClient")
            .field("contract", &self.contract)
            .field("has_signer", &self.signer.is_some())
            .finish()
    }
}

impl<P: ChainProvider> FlagRegistryClient<P> {
    /// Build a client for the configured contract address.
    ///
    /// # Errors
    /// Returns [`DomainError::FlagRegistryNotConfigured`] if no contract
    /// address is set, or a decoding error if the configured private key is
    /// malformed.
    pub fn new(
        chain: Arc<ChainClient<P>>,
        contracts: &ContractSettings,
        chain_settings: &ChainSettings,
    ) -> Result<Self> {
        let address = contracts
            .flag_registry_address
            .as_deref()
            .ok_or(AppError::Domain(DomainError::FlagRegistryNotConfigured))?;
        let contract = parse_address(address)?;

        let signer = chain_settings
            .private_key
            .as_deref()
            .map(|key| {
                PrivateKeySigner::from_str(key.trim_start_matches("0x"))
                    .map_err(|err| AppError::Infra(InfraError::Config(config_err(err.to_string()))))
            })
            .transpose()?;

        let nonce_manager = if signer.is_some() {
            Some(LocalNonceManager::from_arc(chain.provider()))
        } else {
            None
        };

        Ok(Self {
            chain,
            contract,
            confirmations: contracts.confirmations,
            gas_limit_fallback: contracts.gas_limit_fallback,
            signer,
            nonce_manager,
        })
    }

    /// Whether writes are possible (a signer was configured).
    #[must_use]
    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Read whether `wallet` currently carries an active flag.
    pub async fn is_flagged(&self, wallet_canonical: &str) -> Result<bool> {
        let address = parse_address(wallet_canonical)?;
        let calldata = Bytes::from(IFlagRegistry::isWalletFlaggedCall { wallet: address }.abi_encode());
        let request = evm_provider::TransactionRequest::new().to(self.contract).data(calldata);
        let result = self.chain.call(&request).await?;
        IFlagRegistry::isWalletFlaggedCall::abi_decode_returns(&result)
            .map_err(|err| AppError::Infra(InfraError::ContractRejected(err.to_string())))
    }

    /// Read the full flag record for `wallet`, if any is active or was ever written.
    pub async fn get_flag(&self, wallet_canonical: &str) -> Result<Option<WalletFlag>> {
        let address = parse_address(wallet_canonical)?;
        let calldata = Bytes::from(IFlagRegistry::getWalletFlagCall { wallet: address }.abi_encode());
        let request = evm_provider::TransactionRequest::new().to(self.contract).data(calldata);
        let result = self.chain.call(&request).await?;
        let decoded = IFlagRegistry::getWalletFlagCall::abi_decode_returns(&result)
            .map_err(|err| AppError::Infra(InfraError::ContractRejected(err.to_string())))?;

        if !decoded.isFlagged && decoded.flaggedAt.is_zero() {
            return Ok(None);
        }

        let risk_level = RiskLevel::try_from(decoded.riskLevel)
            .map_err(|err| AppError::Domain(DomainError::InvalidRiskLevel(err.to_string())))?;

        Ok(Some(WalletFlag {
            wallet: wallet_canonical.to_string(),
            is_flagged: decoded.isFlagged,
            risk_level,
            reputation_score: u256_to_f64(decoded.reputationScore),
            flagged_at_ms: u256_to_f64(decoded.flaggedAt) as u64 * 1000,
            expires_at_ms: u256_to_f64(decoded.expiresAt) as u64 * 1000,
            flagger: codec::normalize(&decoded.flagger.to_string())
                .map(|(c, _)| c)
                .unwrap_or_default(),
            reason: decoded.reason,
            tx_hash: String::new(),
        }))
    }

    /// List all wallets with any flag record (active or expired).
    pub async fn list_flagged(&self) -> Result<Vec<String>> {
        let calldata = Bytes::from(IFlagRegistry::getAllFlaggedWalletsCall {}.abi_encode());
        let request = evm_provider::TransactionRequest::new().to(self.contract).data(calldata);
        let result = self.chain.call(&request).await?;
        let addresses = IFlagRegistry::getAllFlaggedWalletsCall::abi_decode_returns(&result)
            .map_err(|err| AppError::Infra(InfraError::ContractRejected(err.to_string())))?;
        Ok(addresses
            .into_iter()
            .map(|a| {
                codec::normalize(&a.to_string())
                    .map(|(c, _)| c)
                    .unwrap_or_else(|_| a.to_string().to_lowercase())
            })
            .collect())
    }

    /// Count of currently-active flags.
    pub async fn active_count(&self) -> Result<u64> {
        let calldata = Bytes::from(IFlagRegistry::getActiveFlaggedCountCall {}.abi_encode());
        let request = evm_provider::TransactionRequest::new().to(self.contract).data(calldata);
        let result = self.chain.call(&request).await?;
        let count = IFlagRegistry::getActiveFlaggedCountCall::abi_decode_returns(&result)
            .map_err(|err| AppError::Infra(InfraError::ContractRejected(err.to_string())))?;
        Ok(u256_to_f64(count) as u64)
    }

    /// Flag `wallet` with `risk_level`/`score`/`reason`. If the wallet is
    /// already flagged, this is a no-op idempotent success rather than a
    /// duplicate submission.
    pub async fn flag(
        &self,
        wallet_canonical: &str,
        risk_level: RiskLevel,
        score: f64,
        reason: &str,
    ) -> Result<WriteResult> {
        if self.is_flagged(wallet_canonical).await? {
            return Ok(WriteResult {
                ok: true,
                tx_hash: None,
                error: Some("already flagged".to_string()),
            });
        }

        let address = parse_address(wallet_canonical)?;
        let calldata = Bytes::from(
            IFlagRegistry::flagWalletCall {
                wallet: address,
                score: U256::from(score.round().clamp(0.0, 100.0) as u64),
                reason: reason.to_string(),
            }
            .abi_encode(),
        );
        let _ = risk_level;
        self.submit(calldata).await
    }

    /// Clear `wallet`'s flag. Not-currently-flagged is idempotent success.
    pub async fn unflag(&self, wallet_canonical: &str) -> Result<WriteResult> {
        if !self.is_flagged(wallet_canonical).await? {
            return Ok(WriteResult {
                ok: true,
                tx_hash: None,
                error: Some("not flagged".to_string()),
            });
        }
        let address = parse_address(wallet_canonical)?;
        let calldata = Bytes::from(IFlagRegistry::unflagWalletCall { wallet: address }.abi_encode());
        self.submit(calldata).await
    }

    /// Update the recorded risk level for an already-flagged wallet.
    pub async fn update_risk(&self, wallet_canonical: &str, level: RiskLevel) -> Result<WriteResult> {
        let address = parse_address(wallet_canonical)?;
        let calldata = Bytes::from(
            IFlagRegistry::updateRiskLevelCall {
                wallet: address,
                level: level.as_u8(),
            }
            .abi_encode(),
        );
        self.submit(calldata).await
    }

    async fn submit(&self, calldata: Bytes) -> Result<WriteResult> {
        let Some(signer) = &self.signer else {
            return Err(AppError::Domain(DomainError::SignerNotConfigured));
        };
        let nonce_manager = self
            .nonce_manager
            .as_ref()
            .ok_or(AppError::Domain(DomainError::SignerNotConfigured))?;

        let from = signer.address();
        let nonce = nonce_manager
            .get_and_increment(from)
            .await
            .map_err(|err| AppError::Infra(InfraError::Rpc(Box::new(err))))?;

        let probe = evm_provider::TransactionRequest::new()
            .to(self.contract)
            .data(calldata.clone());
        let gas_limit = self
            .chain
            .estimate_gas(&probe)
            .await
            .unwrap_or(self.gas_limit_fallback);

        let fee_data = self.chain.get_fee_data().await?;

        let mut request = RpcTransactionRequest::default()
            .with_to(self.contract)
            .with_from(from)
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_chain_id(self.chain.provider().chain_id())
            .with_input(calldata);

        request = if fee_data.supports_eip1559() {
            request
                .with_max_fee_per_gas(fee_data.max_fee_per_gas.unwrap_or(fee_data.gas_price))
                .with_max_priority_fee_per_gas(fee_data.max_priority_fee_per_gas.unwrap_or(0))
        } else {
            request.with_gas_price(fee_data.gas_price)
        };

        let wallet = EthereumWallet::from(signer.clone());
        let envelope = request
            .build(&wallet)
            .await
            .map_err(|err| AppError::Infra(InfraError::ContractRejected(err.to_string())))?;
        let raw = Bytes::from(alloy::eips::eip2718::Encodable2718::encoded_2718(&envelope));

        match self.chain.send_raw_transaction(raw).await {
            Ok(tx_hash) => {
                let receipt = self
                    .chain
                    .wait_for_tx(tx_hash, self.confirmations, std::time::Duration::from_secs(60))
                    .await?;
                if receipt.success {
                    Ok(WriteResult {
                        ok: true,
                        tx_hash: Some(tx_hash.to_string()),
                        error: None,
                    })
                } else {
                    let _ = nonce_manager.sync(from).await;
                    Ok(WriteResult {
                        ok: false,
                        tx_hash: Some(tx_hash.to_string()),
                        error: Some("transaction reverted".to_string()),
                    })
                }
            }
            Err(err) => {
                let _ = nonce_manager.sync(from).await;
                Ok(WriteResult {
                    ok: false,
                    tx_hash: None,
                    error: Some(err.to_string()),
                })
            }
        }
    }
}

fn config_err(message: String) -> config::ConfigError {
    config::ConfigError::Message(message)
}
