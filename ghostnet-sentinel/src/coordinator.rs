//! Monitor Coordinator — the operational core: lifecycle, buffering,
//! scoring orchestration, and flagging.
//!
//! Owns the monitors map and per-wallet buffers; every mutation happens
//! through the methods on [`Coordinator`], so the underlying `DashMap`s
//! never need an external lock (§5). Two long-running tasks are spawned per
//! instance: one per-wallet ingestion loop per active monitor, and one
//! shared periodic batch processor.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{interval, MissedTickBehavior};

use evm_provider::ChainProvider;
use fleet_core::safety::CircuitBreaker;

use crate::chain::ChainClient;
use crate::codec;
use crate::config::CoordinatorSettings;
use crate::data_stream::DataStreamCollaborator;
use crate::error::{AppError, DomainError, Result};
use crate::features::FeatureExtractor;
use crate::flag_registry::FlagRegistryClient;
use crate::hub::Hub;
use crate::ingester::Ingester;
use crate::scoring::ScoringEngine;
use crate::types::{IngestionConfig, RiskLevel, ScoringResult, WalletMonitor};

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn now_secs() -> u64 {
    now_ms() / 1000
}

/// Outcome of a lifecycle operation on one wallet.
#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub ok: bool,
    pub message: String,
    pub initial_score: Option<ScoringResult>,
}

struct WalletState {
    monitor: WalletMonitor,
    buffer: VecDeque<crate::types::WalletEvent>,
    stop: Arc<AtomicBool>,
}

/// The Monitor Coordinator: subscription lifecycle, buffering, and scoring
/// orchestration for a dynamic set of wallets.
pub struct Coordinator<P: ChainProvider> {
    chain: Arc<ChainClient<P>>,
    ingester: Arc<Ingester<P>>,
    extractor: Arc<FeatureExtractor>,
    scoring: Arc<ScoringEngine>,
    flag_registry: Option<Arc<FlagRegistryClient<P>>>,
    hub: Arc<Hub>,
    data_stream: Option<Arc<dyn DataStreamCollaborator>>,
    settings: CoordinatorSettings,
    wallets: DashMap<String, WalletState>,
    breaker: AsyncMutex<CircuitBreaker>,
    in_flight_flags: DashMap<String, ()>,
}

impl<P: ChainProvider + 'static> Coordinator<P> {
    /// Build a Coordinator wiring together every upstream collaborator.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        chain: Arc<ChainClient<P>>,
        ingester: Arc<Ingester<P>>,
        extractor: Arc<FeatureExtractor>,
        scoring: Arc<ScoringEngine>,
        flag_registry: Option<Arc<FlagRegistryClient<P>>>,
        hub: Arc<Hub>,
        data_stream: Option<Arc<dyn DataStreamCollaborator>>,
        settings: CoordinatorSettings,
    ) -> Self {
        let breaker = CircuitBreaker::new(
            settings.breaker_trip_threshold,
            settings.breaker_cooldown(),
        );
        Self {
            chain,
            ingester,
            extractor,
            scoring,
            flag_registry,
            hub,
            data_stream,
            settings,
            wallets: DashMap::new(),
            breaker: AsyncMutex::new(breaker),
            in_flight_flags: DashMap::new(),
        }
    }

    /// Canonical addresses of every currently monitored wallet.
    #[must_use]
    pub fn active_wallets(&self) -> Vec<String> {
        self.wallets
            .iter()
            .filter(|entry| entry.value().monitor.active)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Snapshot of one wallet's monitor state, if subscribed.
    #[must_use]
    pub fn status(&self, wallet_canonical: &str) -> Option<WalletMonitor> {
        self.wallets.get(wallet_canonical).map(|entry| entry.monitor.clone())
    }

    /// Idempotently start monitoring `wallet`. Subscription failure (push
    /// collaborator unavailable) is non-fatal: the monitor stays active on
    /// the poll fallback.
    pub async fn start_monitor(
        self: &Arc<Self>,
        wallet: &str,
        config: Option<IngestionConfig>,
    ) -> Result<MonitorOutcome> {
        let (canonical, checksummed) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;

        if let Some(existing) = self.wallets.get(&canonical) {
            return Ok(MonitorOutcome {
                ok: true,
                message: "already monitored".to_string(),
                initial_score: existing.monitor.last_score.clone(),
            });
        }

        let now = now_ms();
        let monitor = WalletMonitor::new(canonical.clone(), checksummed, now, config.unwrap_or_default());
        let stop = Arc::new(AtomicBool::new(false));
        self.wallets.insert(
            canonical.clone(),
            WalletState {
                monitor,
                buffer: VecDeque::new(),
                stop: Arc::clone(&stop),
            },
        );

        // Best-effort historical bootstrap; subscription/ingestion failure
        // here does not prevent the monitor from remaining active.
        let bootstrap_events = self.ingester.bootstrap(&canonical).await.unwrap_or_default();
        let event_count = bootstrap_events.len();
        self.extractor.ingest_many(&canonical, bootstrap_events.iter().cloned());
        if let Some(mut state) = self.wallets.get_mut(&canonical) {
            for _ in 0..event_count {
                state.monitor.record_activity(now);
            }
        }

        let balance = self
            .chain
            .get_balance(parse_address_lenient(&canonical))
            .await
            .ok();
        let features = self.extractor.extract(&canonical, now, balance);
        let score = self.scoring.score(&canonical, features, event_count, now_secs());
        if let Some(mut state) = self.wallets.get_mut(&canonical) {
            state.monitor.last_score = Some(score.clone());
        }
        self.hub.broadcast_score_update(&canonical, &score, None);

        self.spawn_wallet_loop(&canonical, stop);

        Ok(MonitorOutcome {
            ok: true,
            message: "monitoring started".to_string(),
            initial_score: Some(score),
        })
    }

    /// Stop monitoring `wallet`, signalling its ingestion task to exit and
    /// dropping its buffer and dedup state.
    pub fn stop_monitor(&self, wallet: &str) -> Result<MonitorOutcome> {
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;

        match self.wallets.remove(&canonical) {
            Some((_, state)) => {
                state.stop.store(true, Ordering::SeqCst);
                self.ingester.forget(&canonical);
                self.extractor.forget(&canonical);
                Ok(MonitorOutcome {
                    ok: true,
                    message: "monitoring stopped".to_string(),
                    initial_score: None,
                })
            }
            None => Err(AppError::Domain(DomainError::MonitorNotFound(canonical))),
        }
    }

    /// Force an immediate rescore from the wallet's current buffer and
    /// history, without waiting for the next batch tick.
    pub async fn force_rescore(&self, wallet: &str) -> Result<ScoringResult> {
        let (canonical, _) = codec::normalize(wallet)
            .map_err(|e| AppError::Domain(DomainError::InvalidAddress(e.to_string())))?;

        if !self.wallets.contains_key(&canonical) {
            return Err(AppError::Domain(DomainError::MonitorNotFound(canonical)));
        }

        let now = now_ms();
        let balance = self
            .chain
            .get_balance(parse_address_lenient(&canonical))
            .await
            .ok();
        let event_count = self.extractor.history_len(&canonical);
        let features = self.extractor.extract(&canonical, now, balance);
        let score = self.scoring.score(&canonical, features, event_count, now_secs());

        if let Some(mut state) = self.wallets.get_mut(&canonical) {
            state.monitor.last_score = Some(score.clone());
        }
        self.decide_flagging(&canonical, &score).await;
        Ok(score)
    }

    /// Start monitoring a batch of wallets, `batch_sub_batch_size` at a
    /// time with a `batch_inter_batch_delay` pause between sub-batches.
    pub async fn batch_start(
        self: &Arc<Self>,
        wallets: &[String],
        config: Option<IngestionConfig>,
    ) -> (Vec<String>, Vec<(String, String)>) {
        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for chunk in wallets.chunks(self.settings.batch_sub_batch_size.max(1)) {
            for wallet in chunk {
                match self.start_monitor(wallet, config.clone()).await {
                    Ok(_) => successes.push(wallet.clone()),
                    Err(err) => failures.push((wallet.clone(), err.to_string())),
                }
            }
            tokio::time::sleep(self.settings.batch_inter_batch_delay()).await;
        }

        (successes, failures)
    }

    /// Ingest one freshly observed event for `wallet` (called by the
    /// per-wallet ingestion loop, one wallet at a time).
    async fn intake(&self, wallet: &str, event: crate::types::WalletEvent) {
        let Some(mut state) = self.wallets.get_mut(wallet) else {
            return;
        };
        if !state.monitor.active {
            return;
        }

        let now = now_ms();
        state.monitor.record_activity(now);
        self.extractor.ingest(wallet, event.clone());

        // Immediate path: score right away against the full history so far
        // and broadcast a transaction alert plus a responsive score update.
        let balance = None; // avoided per-event chain round trip; batch pass refreshes balance.
        let features = self.extractor.extract(wallet, now, balance);
        let event_count = state.monitor.event_count as usize;
        let quick_score = self.scoring.score(wallet, features, event_count, now / 1000);
        let previous = state.monitor.last_score.clone();
        self.hub.broadcast_tx_alert(
            wallet,
            &event,
            quick_score.risk_level,
            previous
                .as_ref()
                .map_or(0.0, |p| quick_score.reputation_score - p.reputation_score),
        );
        self.hub.broadcast_score_update(wallet, &quick_score, previous.as_ref());

        // Buffered path: accumulate for the periodic batch pass.
        state.buffer.push_back(event);
        while state.buffer.len() > self.settings.buffer_cap_per_wallet {
            state.buffer.pop_front();
        }
    }

    /// Drive one wallet's ingestion loop (poll or push) until `stop` is set
    /// or the wallet's circuit breaker trips.
    fn spawn_wallet_loop(self: &Arc<Self>, wallet: &str, stop: Arc<AtomicBool>) {
        let coordinator = Arc::clone(self);
        let wallet = wallet.to_string();
        tokio::spawn(async move {
            let mut ticker = interval(coordinator.settings.wallet_poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if stop.load(Ordering::SeqCst) {
                    break;
                }

                match coordinator.ingester.poll_tick(&wallet).await {
                    Ok(events) => {
                        let mut breaker = coordinator.breaker.lock().await;
                        breaker.record_success(&wallet);
                        drop(breaker);
                        for event in events {
                            if stop.load(Ordering::SeqCst) {
                                break;
                            }
                            coordinator.intake(&wallet, event).await;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(wallet = %wallet, error = %err, "ingestion tick failed");
                        let mut breaker = coordinator.breaker.lock().await;
                        let tripped = breaker.record_error(&wallet);
                        drop(breaker);
                        if tripped {
                            if let Some(mut state) = coordinator.wallets.get_mut(&wallet) {
                                state.monitor.active = false;
                            }
                            tracing::error!(wallet = %wallet, "circuit breaker tripped, monitor deactivated");
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Spawn the shared periodic batch processor. Returns its `JoinHandle`
    /// so the caller can await it on shutdown.
    pub fn spawn_batch_processor(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(coordinator.settings.batch_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                coordinator.run_batch_tick().await;
            }
        })
    }

    async fn run_batch_tick(&self) {
        let wallets: Vec<String> = self
            .wallets
            .iter()
            .filter(|entry| entry.value().monitor.active && !entry.value().buffer.is_empty())
            .map(|entry| entry.key().clone())
            .collect();

        for wallet in wallets {
            let drained = {
                let Some(mut state) = self.wallets.get_mut(&wallet) else {
                    continue;
                };
                std::mem::take(&mut state.buffer)
            };
            if drained.is_empty() {
                continue;
            }

            let now = now_ms();
            let balance = self
                .chain
                .get_balance(parse_address_lenient(&wallet))
                .await
                .ok();
            let features = self.extractor.extract(&wallet, now, balance);
            let event_count = self.extractor.history_len(&wallet);
            let new_score = self.scoring.score(&wallet, features, event_count, now / 1000);

            let previous = self
                .wallets
                .get(&wallet)
                .and_then(|entry| entry.monitor.last_score.clone());

            self.decide_flagging(&wallet, &new_score).await;

            // New events were processed this tick (the buffer wasn't empty),
            // so the score update is broadcast unconditionally per §4.8.
            self.hub.broadcast_score_update(&wallet, &new_score, previous.as_ref());

            if let Some(collaborator) = &self.data_stream {
                let record = serde_json::json!({
                    "wallet": wallet,
                    "score": new_score,
                });
                let _ = collaborator.publish(&record).await;
            }

            if let Some(mut state) = self.wallets.get_mut(&wallet) {
                state.monitor.last_score = Some(new_score);
            }
        }
    }

    /// §4.8.a: flag a wallet whose score just crossed the critical
    /// threshold, serializing in-flight flag calls per wallet.
    async fn decide_flagging(&self, wallet: &str, score: &ScoringResult) {
        if !score.meets_flagging_threshold() {
            return;
        }
        let Some(registry) = self.flag_registry.as_ref() else {
            return;
        };
        if self.in_flight_flags.insert(wallet.to_string(), ()).is_some() {
            // Another flag attempt for this wallet is already outstanding.
            return;
        }

        let result = registry
            .flag(wallet, RiskLevel::Critical, score.reputation_score, &score.explanation)
            .await;
        self.in_flight_flags.remove(wallet);

        match result {
            Ok(write) if write.ok && write.tx_hash.is_some() => {
                self.hub.broadcast_flagged(
                    wallet,
                    RiskLevel::Critical,
                    score.reputation_score,
                    write.tx_hash.as_deref(),
                );
            }
            Ok(_) => {
                // Idempotent no-op: already flagged on-chain.
            }
            Err(err) => {
                tracing::error!(wallet = %wallet, error = %err, "flag write failed");
            }
        }
    }
}

/// Parse a canonical address string, falling back to the zero address if it
/// somehow fails (the string was already validated by `codec::normalize`).
fn parse_address_lenient(canonical: &str) -> alloy::primitives::Address {
    use std::str::FromStr;
    alloy::primitives::Address::from_str(canonical).unwrap_or(alloy::primitives::Address::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChainSettings, HubSettings};
    use crate::scoring::ScoringEngine;
    use evm_provider::mock::MockProvider;

    fn chain_settings() -> ChainSettings {
        ChainSettings {
            url: "http://localhost:8545".into(),
            chain_id: 1,
            private_key: None,
            max_attempts: 1,
            retry_base_ms: 1,
            retry_max_delay_ms: 5,
            request_timeout_ms: 1000,
        }
    }

    fn hub_settings() -> HubSettings {
        HubSettings {
            max_subs_per_conn: 50,
            heartbeat_interval_ms: 30_000,
            connection_timeout_ms: 300_000,
            rate_limit_window_ms: 60_000,
            rate_limit_max_messages: 100,
            idle_reaper_interval_ms: 60_000,
        }
    }

    fn coordinator_settings() -> CoordinatorSettings {
        CoordinatorSettings {
            block_poll_interval_ms: 4000,
            wallet_poll_interval_ms: 50,
            batch_interval_ms: 50,
            buffer_cap_per_wallet: 1000,
            batch_sub_batch_size: 10,
            batch_inter_batch_delay_ms: 1,
            breaker_trip_threshold: 5,
            breaker_cooldown_ms: 60_000,
        }
    }

    fn build_coordinator() -> Arc<Coordinator<MockProvider>> {
        let chain = Arc::new(ChainClient::new(Arc::new(MockProvider::new()), &chain_settings()));
        let ingester = Arc::new(Ingester::new(Arc::clone(&chain), None));
        let extractor = Arc::new(FeatureExtractor::new());
        let scoring = Arc::new(ScoringEngine::fallback_only());
        let hub = Arc::new(Hub::new(hub_settings()));
        Arc::new(Coordinator::new(
            chain,
            ingester,
            extractor,
            scoring,
            None,
            hub,
            None,
            coordinator_settings(),
        ))
    }

    #[tokio::test]
    async fn start_monitor_is_idempotent() {
        let coordinator = build_coordinator();
        let wallet = "0x1111111111111111111111111111111111111111";
        let first = coordinator.start_monitor(wallet, None).await.unwrap();
        assert!(first.ok);
        let second = coordinator.start_monitor(wallet, None).await.unwrap();
        assert!(second.ok);
        assert_eq!(coordinator.active_wallets().len(), 1);
    }

    #[tokio::test]
    async fn stop_monitor_removes_wallet() {
        let coordinator = build_coordinator();
        let wallet = "0x1111111111111111111111111111111111111111";
        coordinator.start_monitor(wallet, None).await.unwrap();
        let outcome = coordinator.stop_monitor(wallet).unwrap();
        assert!(outcome.ok);
        assert!(coordinator.active_wallets().is_empty());
    }

    #[tokio::test]
    async fn stop_monitor_on_unknown_wallet_errors() {
        let coordinator = build_coordinator();
        let err = coordinator
            .stop_monitor("0x1111111111111111111111111111111111111111")
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::MonitorNotFound(_))));
    }

    #[tokio::test]
    async fn force_rescore_requires_existing_monitor() {
        let coordinator = build_coordinator();
        let err = coordinator
            .force_rescore("0x1111111111111111111111111111111111111111")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::MonitorNotFound(_))));
    }

    #[tokio::test]
    async fn batch_start_reports_successes() {
        let coordinator = build_coordinator();
        let wallets = vec![
            "0x1111111111111111111111111111111111111111".to_string(),
            "0x2222222222222222222222222222222222222222".to_string(),
        ];
        let (successes, failures) = coordinator.batch_start(&wallets, None).await;
        assert_eq!(successes.len(), 2);
        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn status_reflects_active_monitor() {
        let coordinator = build_coordinator();
        let wallet = "0x1111111111111111111111111111111111111111";
        coordinator.start_monitor(wallet, None).await.unwrap();
        let status = coordinator.status(wallet).unwrap();
        assert!(status.active);
    }
}
