//! Synchronous-shaped entry points for the wallet-monitoring pipeline.
//!
//! Every method validates its inputs through the Codec before touching the
//! Coordinator or Flag Registry Client, and returns a structured
//! `{success, data | error}`-shaped response rather than propagating
//! [`crate::error::AppError`] directly, per §4.9. Construction errors
//! (invalid address, batch too large) still surface as `AppError` so the
//! HTTP layer can map them to the right status code.

use std::collections::HashMap;
use std::sync::Arc;

use evm_provider::ChainProvider;
use serde::Serialize;

use crate::codec;
use crate::coordinator::Coordinator;
use crate::error::{AppError, DomainError, Result};
use crate::flag_registry::FlagRegistryClient;
use crate::types::{IngestionConfig, RiskLevel, ScoringResult, WalletFlag, WalletMonitor};

/// Maximum wallets accepted by one `batch_score` / `batch_start` call.
pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub wallet: String,
    pub message: String,
    pub existing_score: Option<ScoringResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnsubscribeResponse {
    pub success: bool,
    pub wallet: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub success: bool,
    pub wallet: String,
    pub score: Option<ScoringResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchScoreResponse {
    pub success: bool,
    pub scores: HashMap<String, ScoringResult>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub wallet: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlagResponse {
    pub success: bool,
    pub wallet: String,
    pub tx_hash: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlagStatusResponse {
    pub success: bool,
    pub wallet: String,
    pub is_flagged: bool,
    pub flag_details: Option<WalletFlag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveResponse {
    pub success: bool,
    pub wallets: Vec<String>,
    pub count: usize,
}

/// Thin, `axum`-free facade over the Coordinator and Flag Registry Client.
pub struct ApiFacade<P: ChainProvider> {
    coordinator: Arc<Coordinator<P>>,
    flag_registry: Option<Arc<FlagRegistryClient<P>>>,
}

impl<P: ChainProvider + 'static> ApiFacade<P> {
    /// Build a facade over an already-wired Coordinator and optional Flag
    /// Registry Client.
    #[must_use]
    pub fn new(coordinator: Arc<Coordinator<P>>, flag_registry: Option<Arc<FlagRegistryClient<P>>>) -> Self {
        Self {
            coordinator,
            flag_registry,
        }
    }

    /// `subscribe(wallet, session?, include_tx?)` -> delegates to `start_monitor`.
    pub async fn subscribe(
        &self,
        wallet: &str,
        _session: Option<String>,
        include_tx: Option<bool>,
    ) -> Result<SubscribeResponse> {
        let config = include_tx.map(|include| IngestionConfig {
            include_native_transfers: include,
            ..IngestionConfig::default()
        });
        let outcome = self.coordinator.start_monitor(wallet, config).await?;
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;
        Ok(SubscribeResponse {
            success: outcome.ok,
            wallet: canonical,
            message: outcome.message,
            existing_score: outcome.initial_score,
        })
    }

    /// `unsubscribe(wallet, session?)` -> `stop_monitor`.
    pub fn unsubscribe(&self, wallet: &str, _session: Option<String>) -> Result<UnsubscribeResponse> {
        let outcome = self.coordinator.stop_monitor(wallet)?;
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;
        Ok(UnsubscribeResponse {
            success: outcome.ok,
            wallet: canonical,
            message: outcome.message,
        })
    }

    /// `get_score(wallet, refresh?)` -> cached `last_score` or `force_rescore`.
    pub async fn get_score(&self, wallet: &str, refresh: bool) -> Result<ScoreResponse> {
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;

        let score = if refresh {
            Some(self.coordinator.force_rescore(&canonical).await?)
        } else {
            let status = self
                .coordinator
                .status(&canonical)
                .ok_or_else(|| AppError::Domain(DomainError::MonitorNotFound(canonical.clone())))?;
            status.last_score
        };

        Ok(ScoreResponse {
            success: true,
            wallet: canonical,
            score,
        })
    }

    /// `batch_score(wallets[])` -> `batch_start` then collect current scores.
    pub async fn batch_score(&self, wallets: &[String]) -> Result<BatchScoreResponse> {
        if wallets.len() > MAX_BATCH_SIZE {
            return Err(AppError::Domain(DomainError::BatchTooLarge(wallets.len(), MAX_BATCH_SIZE)));
        }

        let (_, failed_to_start) = self.coordinator.batch_start(wallets, None).await;
        let mut failures: Vec<BatchFailure> = failed_to_start
            .into_iter()
            .map(|(wallet, error)| BatchFailure { wallet, error })
            .collect();

        let mut scores = HashMap::new();
        for wallet in wallets {
            let Ok((canonical, _)) = codec::normalize(wallet) else {
                failures.push(BatchFailure {
                    wallet: wallet.clone(),
                    error: "invalid address".to_string(),
                });
                continue;
            };
            match self.coordinator.status(&canonical).and_then(|s| s.last_score) {
                Some(score) => {
                    scores.insert(canonical, score);
                }
                None => failures.push(BatchFailure {
                    wallet: canonical,
                    error: "no score available yet".to_string(),
                }),
            }
        }

        Ok(BatchScoreResponse {
            success: true,
            scores,
            failures,
        })
    }

    /// `flag(wallet, level, score, reason)` -> Flag Registry `flag`.
    pub async fn flag(&self, wallet: &str, level: RiskLevel, score: f64, reason: &str) -> Result<FlagResponse> {
        if !(0.0..=100.0).contains(&score) {
            return Err(AppError::Domain(DomainError::InvalidScore(score)));
        }
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;

        let registry = self
            .flag_registry
            .as_ref()
            .ok_or(AppError::Domain(DomainError::FlagRegistryNotConfigured))?;
        if !registry.has_signer() {
            return Err(AppError::Domain(DomainError::SignerNotConfigured));
        }

        let write = registry.flag(&canonical, level, score, reason).await?;
        Ok(FlagResponse {
            success: write.ok,
            wallet: canonical,
            tx_hash: write.tx_hash,
            message: write.error,
        })
    }

    /// `flag_status(wallet)` -> `{is_flagged, flag_details}`.
    pub async fn flag_status(&self, wallet: &str) -> Result<FlagStatusResponse> {
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;
        let registry = self
            .flag_registry
            .as_ref()
            .ok_or(AppError::Domain(DomainError::FlagRegistryNotConfigured))?;

        let flag_details = registry.get_flag(&canonical).await?;
        let is_flagged = flag_details.as_ref().is_some_and(|flag| flag.is_flagged);

        Ok(FlagStatusResponse {
            success: true,
            wallet: canonical,
            is_flagged,
            flag_details,
        })
    }

    /// `active()` -> `active_wallets()` + monitoring stats.
    #[must_use]
    pub fn active(&self) -> ActiveResponse {
        let wallets = self.coordinator.active_wallets();
        ActiveResponse {
            success: true,
            count: wallets.len(),
            wallets,
        }
    }

    /// Raw monitor snapshot for one wallet, used by the `/wallets/{addr}/score`
    /// route when it needs more than just the score.
    #[must_use]
    pub fn monitor(&self, wallet_canonical: &str) -> Option<WalletMonitor> {
        self.coordinator.status(wallet_canonical)
    }
}
