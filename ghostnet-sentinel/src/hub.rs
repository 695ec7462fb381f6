//! Broadcast Hub — tracks downstream client connections and fans out
//! messages to subscribers.
//!
//! The connection table and fanout logic are transport-agnostic: each
//! connection is represented by an [`OutboundSink`] plus a
//! [`ClientConnectionMeta`]. The `axum` WebSocket upgrade handler at the
//! bottom of this module is the only piece that knows about sockets; the
//! rest of the Hub can be driven by an in-memory test sink.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use crate::codec;
use crate::config::HubSettings;
use crate::types::{ClientConnectionMeta, RiskLevel, ScoringResult, WalletEvent};

/// Protocol version stamped on every outbound envelope.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// The seven message types the downstream client protocol recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Subscribe,
    Unsubscribe,
    Heartbeat,
    ScoreUpdate,
    TransactionAlert,
    WalletFlagged,
    Error,
}

impl MessageType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Heartbeat => "heartbeat",
            Self::ScoreUpdate => "score_update",
            Self::TransactionAlert => "transaction_alert",
            Self::WalletFlagged => "wallet_flagged",
            Self::Error => "error",
        }
    }
}

/// Build the `{ type, id, timestamp, version, data }` envelope for one
/// outbound message.
fn envelope(msg_type: MessageType, id: &str, now_ms: u64, data: Value) -> Value {
    json!({
        "type": msg_type.as_str(),
        "id": id,
        "timestamp": now_ms,
        "version": PROTOCOL_VERSION,
        "data": data,
    })
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A transport-agnostic outbound channel to one connected client.
///
/// Implementations must not block the Hub's broadcast loop; a buffered
/// channel send is the expected shape.
pub trait OutboundSink: Send + Sync {
    /// Deliver one already-serialized envelope. Returns `false` if the
    /// connection looks dead and should be dropped.
    fn send(&self, envelope: Value) -> bool;
}

/// An [`OutboundSink`] backed by a bounded `mpsc` channel, paired with a
/// task that forwards received envelopes to a live `axum` WebSocket.
pub struct ChannelSink {
    tx: mpsc::Sender<Value>,
}

impl OutboundSink for ChannelSink {
    fn send(&self, envelope: Value) -> bool {
        self.tx.try_send(envelope).is_ok()
    }
}

/// An in-memory sink that records every envelope sent to it, for tests and
/// for driving Hub logic without a live socket.
#[derive(Default)]
pub struct RecordingSink {
    sent: std::sync::Mutex<Vec<Value>>,
}

impl OutboundSink for RecordingSink {
    fn send(&self, envelope: Value) -> bool {
        self.sent.lock().expect("recording sink mutex poisoned").push(envelope);
        true
    }
}

impl RecordingSink {
    /// Snapshot of every envelope delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().expect("recording sink mutex poisoned").clone()
    }
}

struct Connection {
    meta: ClientConnectionMeta,
    sink: Arc<dyn OutboundSink>,
}

/// Tracks connected clients, their subscriptions, and fans out broadcasts.
///
/// The connections table is a `DashMap` so joins, leaves, and broadcasts can
/// run concurrently without a global lock; a broadcast iterates a snapshot
/// of the table, so connections that join or leave mid-fanout don't corrupt
/// the iteration (§5).
pub struct Hub {
    connections: DashMap<String, Connection>,
    settings: HubSettings,
}

impl Hub {
    /// Build an empty Hub.
    #[must_use]
    pub fn new(settings: HubSettings) -> Self {
        Self {
            connections: DashMap::new(),
            settings,
        }
    }

    /// Number of currently tracked connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Accept a new connection, recording its metadata and sink, and send it
    /// a welcome heartbeat.
    pub fn accept(&self, id: String, sink: Arc<dyn OutboundSink>) {
        let now = now_ms();
        let meta = ClientConnectionMeta::new(id.clone(), now);
        let heartbeat = self.heartbeat_payload(now);
        sink.send(envelope(MessageType::Heartbeat, &new_id(), now, heartbeat));
        self.connections.insert(id, Connection { meta, sink });
    }

    /// Remove a connection and free its subscriptions.
    pub fn remove(&self, id: &str) {
        self.connections.remove(id);
    }

    fn heartbeat_payload(&self, now: u64) -> Value {
        json!({
            "serverTime": now,
            "activeConnections": self.connections.len(),
            "memoryUsage": coarse_memory_usage(),
        })
    }

    /// Handle one inbound control frame `{ type, data }` from connection `id`.
    ///
    /// Returns the reply envelope that should be sent back to the same
    /// connection, if any. Updates rate-limit and last-activity state as a
    /// side effect; a message past the rate limit is dropped and an `error`
    /// reply is returned instead of the requested action.
    pub fn handle_inbound(&self, id: &str, msg_type: &str, data: &Value) -> Option<Value> {
        let now = now_ms();
        let Some(mut entry) = self.connections.get_mut(id) else {
            return None;
        };

        entry.meta.last_activity_ms = now;
        let accepted = entry.meta.rate_window.try_record(
            now,
            self.settings.rate_limit_window_ms,
            self.settings.rate_limit_max_messages,
        );
        if !accepted {
            return Some(envelope(
                MessageType::Error,
                &new_id(),
                now,
                json!({
                    "code": "RATE_LIMIT_EXCEEDED",
                    "message": "message rate limit exceeded",
                    "recoverable": true,
                }),
            ));
        }

        match msg_type {
            "subscribe" => Some(self.handle_subscribe(&mut entry.meta, data, now)),
            "unsubscribe" => Some(self.handle_unsubscribe(&mut entry.meta, data, now)),
            "ping" => Some(envelope(MessageType::Heartbeat, &new_id(), now, json!({"pong": true}))),
            other => Some(envelope(
                MessageType::Error,
                &new_id(),
                now,
                json!({
                    "code": "UNKNOWN_MESSAGE_TYPE",
                    "message": format!("unrecognized message type: {other}"),
                    "recoverable": true,
                }),
            )),
        }
    }

    fn handle_subscribe(&self, meta: &mut ClientConnectionMeta, data: &Value, now: u64) -> Value {
        let session_id = data.get("sessionId").and_then(Value::as_str).map(str::to_string);
        let Some(wallet) = data.get("wallet").and_then(Value::as_str) else {
            return envelope(
                MessageType::Error,
                &new_id(),
                now,
                json!({"code": "BAD_REQUEST", "message": "missing wallet", "recoverable": true}),
            );
        };

        let Ok((canonical, _)) = codec::normalize(wallet) else {
            return envelope(
                MessageType::Error,
                &new_id(),
                now,
                json!({"code": "BAD_REQUEST", "message": "invalid wallet address", "recoverable": true}),
            );
        };

        let (subscribed, message) = if meta.subscribed_wallets.contains(&canonical) {
            (true, "already subscribed".to_string())
        } else if !meta.can_subscribe_more(self.settings.max_subs_per_conn) {
            (false, "subscription limit exceeded".to_string())
        } else {
            meta.subscribed_wallets.insert(canonical.clone());
            (true, "subscribed".to_string())
        };

        if session_id.is_some() {
            meta.session_id = session_id.clone();
        }

        envelope(
            MessageType::Subscribe,
            &new_id(),
            now,
            json!({
                "wallet": canonical,
                "sessionId": session_id,
                "subscribed": subscribed,
                "message": message,
            }),
        )
    }

    fn handle_unsubscribe(&self, meta: &mut ClientConnectionMeta, data: &Value, now: u64) -> Value {
        let session_id = data.get("sessionId").and_then(Value::as_str).map(str::to_string);
        let Some(wallet) = data.get("wallet").and_then(Value::as_str) else {
            return envelope(
                MessageType::Error,
                &new_id(),
                now,
                json!({"code": "BAD_REQUEST", "message": "missing wallet", "recoverable": true}),
            );
        };
        let Ok((canonical, _)) = codec::normalize(wallet) else {
            return envelope(
                MessageType::Error,
                &new_id(),
                now,
                json!({"code": "BAD_REQUEST", "message": "invalid wallet address", "recoverable": true}),
            );
        };

        let unsubscribed = meta.subscribed_wallets.remove(&canonical);
        envelope(
            MessageType::Unsubscribe,
            &new_id(),
            now,
            json!({
                "wallet": canonical,
                "sessionId": session_id,
                "unsubscribed": unsubscribed,
                "message": if unsubscribed { "unsubscribed" } else { "was not subscribed" },
            }),
        )
    }

    /// Send `envelope` to every connection subscribed to `wallet_canonical`.
    /// Best-effort: a dead sink is logged and skipped, other connections are
    /// unaffected.
    fn fanout(&self, wallet_canonical: &str, envelope: Value) {
        for entry in &self.connections {
            let connection = entry.value();
            if connection.meta.subscribed_wallets.contains(wallet_canonical) {
                if !connection.sink.send(envelope.clone()) {
                    tracing::warn!(connection = %entry.key(), "dropped message to dead sink");
                }
            }
        }
    }

    /// Broadcast a score update to every subscriber of `wallet`.
    pub fn broadcast_score_update(
        &self,
        wallet_canonical: &str,
        new_score: &ScoringResult,
        previous_score: Option<&ScoringResult>,
    ) {
        let now = now_ms();
        let data = json!({
            "wallet": wallet_canonical,
            "score": new_score,
            "previousScore": previous_score,
        });
        self.fanout(wallet_canonical, envelope(MessageType::ScoreUpdate, &new_id(), now, data));
    }

    /// Broadcast a transaction alert to every subscriber of `wallet`.
    pub fn broadcast_tx_alert(
        &self,
        wallet_canonical: &str,
        event: &WalletEvent,
        risk_level: RiskLevel,
        score_delta: f64,
    ) {
        let now = now_ms();
        // §4.7: event timestamps must be milliseconds; synthesize events
        // always carry block_timestamp_ms already in ms, so no conversion
        // is needed here, but a defensive check guards against a push
        // payload that slipped through in seconds.
        let timestamp_ms = if event.block_timestamp_ms < 10_000_000_000 {
            event.block_timestamp_ms * 1000
        } else {
            event.block_timestamp_ms
        };
        let mut tx = serde_json::to_value(event).unwrap_or(Value::Null);
        if let Some(obj) = tx.as_object_mut() {
            obj.insert("block_timestamp_ms".to_string(), json!(timestamp_ms));
        }
        let data = json!({
            "wallet": wallet_canonical,
            "transaction": tx,
            "riskLevel": risk_level,
            "scoreImpact": score_delta,
        });
        self.fanout(
            wallet_canonical,
            envelope(MessageType::TransactionAlert, &new_id(), now, data),
        );
    }

    /// Broadcast a wallet-flagged notification to every subscriber.
    pub fn broadcast_flagged(
        &self,
        wallet_canonical: &str,
        risk_level: RiskLevel,
        score: f64,
        tx_hash: Option<&str>,
    ) {
        let now = now_ms();
        let data = json!({
            "wallet": wallet_canonical,
            "riskLevel": risk_level,
            "score": score,
            "contractTxHash": tx_hash,
            "flaggedAt": now,
        });
        self.fanout(wallet_canonical, envelope(MessageType::WalletFlagged, &new_id(), now, data));
    }

    /// Broadcast a heartbeat to every connection, regardless of subscriptions.
    fn broadcast_heartbeat(&self) {
        let now = now_ms();
        let data = self.heartbeat_payload(now);
        let msg = envelope(MessageType::Heartbeat, &new_id(), now, data);
        for entry in &self.connections {
            entry.value().sink.send(msg.clone());
        }
    }

    /// Close every connection idle longer than `connection_timeout_ms`.
    fn reap_idle(&self) {
        let now = now_ms();
        let timeout = self.settings.connection_timeout_ms;
        let stale: Vec<String> = self
            .connections
            .iter()
            .filter(|entry| entry.value().meta.is_idle(now, timeout))
            .map(|entry| entry.key().clone())
            .collect();
        for id in stale {
            tracing::info!(connection = %id, "reaping idle connection");
            self.connections.remove(&id);
        }
    }

    /// Snapshot of currently-connected ids, for diagnostics.
    #[must_use]
    pub fn connection_ids(&self) -> Vec<String> {
        self.connections.iter().map(|entry| entry.key().clone()).collect()
    }
}

fn coarse_memory_usage() -> Value {
    // No portable, dependency-free way to read RSS here; report the
    // allocator-independent figure the spec asks for as "coarse" and leave
    // a richer figure to the Prometheus exporter (see `metrics.rs`).
    json!({ "unit": "bytes", "rss": Value::Null })
}

/// Spawn the Hub's two background tasks: heartbeat fanout and idle reaping.
/// Returns their `JoinHandle`s so the caller can await them on shutdown.
pub fn spawn_background_tasks(hub: Arc<Hub>) -> (tokio::task::JoinHandle<()>, tokio::task::JoinHandle<()>) {
    let heartbeat_hub = Arc::clone(&hub);
    let heartbeat_interval = hub.settings.heartbeat_interval();
    let heartbeat_task = tokio::spawn(async move {
        let mut ticker = interval(heartbeat_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            heartbeat_hub.broadcast_heartbeat();
        }
    });

    let reaper_hub = Arc::clone(&hub);
    let reaper_interval = hub.settings.idle_reaper_interval();
    let reaper_task = tokio::spawn(async move {
        let mut ticker = interval(reaper_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            reaper_hub.reap_idle();
        }
    });

    (heartbeat_task, reaper_task)
}

// ═══════════════════════════════════════════════════════════════════════════════
// AXUM TRANSPORT ADAPTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Drive one accepted `axum` WebSocket through the Hub until it disconnects.
///
/// Splits the socket into sender/receiver halves (mirroring the teacher's
/// websocket relay pattern): a forwarding task drains a bounded `mpsc`
/// channel into the socket's sender half, while this task reads inbound
/// frames and feeds them to [`Hub::handle_inbound`].
pub async fn serve_connection(hub: Arc<Hub>, socket: WebSocket) {
    use futures::{SinkExt, StreamExt};

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Value>(256);
    let id = new_id();

    hub.accept(id.clone(), Arc::new(ChannelSink { tx }));

    let forward_id = id.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            let text = envelope.to_string();
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        tracing::debug!(connection = %forward_id, "outbound forwarder exiting");
    });

    while let Some(Ok(message)) = ws_rx.next().await {
        match message {
            Message::Text(text) => {
                let Ok(parsed) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                let Some(msg_type) = parsed.get("type").and_then(Value::as_str) else {
                    continue;
                };
                let empty = json!({});
                let data = parsed.get("data").unwrap_or(&empty);
                if let Some(reply) = hub.handle_inbound(&id, msg_type, data) {
                    // The reply is delivered via the same connection's sink
                    // rather than directly, so ordering with any concurrent
                    // broadcast fanout is preserved (§5).
                    if let Some(connection) = hub_connection_sink(&hub, &id) {
                        connection.send(reply);
                    }
                }
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
            Message::Binary(_) => {}
        }
    }

    hub.remove(&id);
    forward_task.abort();
}

fn hub_connection_sink(hub: &Hub, id: &str) -> Option<Arc<dyn OutboundSink>> {
    hub.connections.get(id).map(|entry| Arc::clone(&entry.sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventKind, FeatureVector, TxStatus};
    use alloy::primitives::U256;

    fn settings() -> HubSettings {
        HubSettings {
            max_subs_per_conn: 2,
            heartbeat_interval_ms: 30_000,
            connection_timeout_ms: 300_000,
            rate_limit_window_ms: 60_000,
            rate_limit_max_messages: 100,
            idle_reaper_interval_ms: 60_000,
        }
    }

    fn sample_event() -> WalletEvent {
        WalletEvent {
            kind: EventKind::Transfer,
            hash: "0xabc".into(),
            sender: "0x1111111111111111111111111111111111111111".into(),
            receiver: Some("0x2222222222222222222222222222222222222222".into()),
            value: U256::from(1u64),
            block_height: 1,
            block_timestamp_ms: 1_700_000_000_000,
            gas_price: U256::from(1u64),
            gas_used: 21000,
            status: TxStatus::Success,
            input: vec![],
            contract_address: None,
            token_symbol: None,
            token_value: None,
            method_selector: None,
            nonce: 0,
            log_index: None,
        }
    }

    fn sample_score(wallet: &str) -> ScoringResult {
        ScoringResult {
            wallet: wallet.to_string(),
            reputation_score: 80.0,
            risk_level: RiskLevel::Low,
            confidence: 0.5,
            features: FeatureVector::empty(),
            computed_at_secs: 0,
            event_count: 1,
            flags: vec![],
            explanation: String::new(),
        }
    }

    #[test]
    fn accept_sends_welcome_heartbeat() {
        let hub = Hub::new(settings());
        let sink = Arc::new(RecordingSink::default());
        hub.accept("c1".into(), sink.clone());
        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["type"], "heartbeat");
    }

    #[test]
    fn subscribe_then_unsubscribe_round_trip() {
        let hub = Hub::new(settings());
        hub.accept("c1".into(), Arc::new(RecordingSink::default()));

        let reply = hub
            .handle_inbound("c1", "subscribe", &json!({"wallet": "0x1111111111111111111111111111111111111111"}))
            .unwrap();
        assert_eq!(reply["data"]["subscribed"], true);

        let reply = hub
            .handle_inbound("c1", "unsubscribe", &json!({"wallet": "0x1111111111111111111111111111111111111111"}))
            .unwrap();
        assert_eq!(reply["data"]["unsubscribed"], true);
    }

    #[test]
    fn subscription_cap_enforced_via_settings() {
        let hub = Hub::new(settings());
        hub.accept("c1".into(), Arc::new(RecordingSink::default()));
        for i in 0..2 {
            let addr = format!("0x{:040x}", i + 1);
            let reply = hub.handle_inbound("c1", "subscribe", &json!({"wallet": addr})).unwrap();
            assert_eq!(reply["data"]["subscribed"], true);
        }
        let reply = hub
            .handle_inbound("c1", "subscribe", &json!({"wallet": format!("0x{:040x}", 99)}))
            .unwrap();
        assert_eq!(reply["data"]["subscribed"], false);
    }

    #[test]
    fn broadcast_routes_only_to_subscribers() {
        let hub = Hub::new(settings());
        let sink_a = Arc::new(RecordingSink::default());
        let sink_b = Arc::new(RecordingSink::default());
        hub.accept("a".into(), sink_a.clone());
        hub.accept("b".into(), sink_b.clone());

        let wallet = "0x1111111111111111111111111111111111111111";
        hub.handle_inbound("a", "subscribe", &json!({"wallet": wallet}));

        hub.broadcast_tx_alert(wallet, &sample_event(), RiskLevel::Low, 0.0);

        let a_msgs = sink_a.sent();
        let b_msgs = sink_b.sent();
        assert!(a_msgs.iter().any(|m| m["type"] == "transaction_alert"));
        assert!(!b_msgs.iter().any(|m| m["type"] == "transaction_alert"));
    }

    #[test]
    fn score_update_envelope_carries_previous_score() {
        let hub = Hub::new(settings());
        let sink = Arc::new(RecordingSink::default());
        let wallet = "0x1111111111111111111111111111111111111111";
        hub.accept("a".into(), sink.clone());
        hub.handle_inbound("a", "subscribe", &json!({"wallet": wallet}));

        hub.broadcast_score_update(wallet, &sample_score(wallet), Some(&sample_score(wallet)));
        let sent = sink.sent();
        let score_msg = sent.iter().find(|m| m["type"] == "score_update").unwrap();
        assert!(score_msg["data"]["previousScore"].is_object());
    }

    #[test]
    fn rate_limit_exceeded_yields_error_reply() {
        let mut tight = settings();
        tight.rate_limit_max_messages = 1;
        let hub = Hub::new(tight);
        hub.accept("c1".into(), Arc::new(RecordingSink::default()));

        let wallet = "0x1111111111111111111111111111111111111111";
        let first = hub.handle_inbound("c1", "subscribe", &json!({"wallet": wallet})).unwrap();
        assert_eq!(first["type"], "subscribe");

        let second = hub.handle_inbound("c1", "subscribe", &json!({"wallet": wallet})).unwrap();
        assert_eq!(second["type"], "error");
        assert_eq!(second["data"]["code"], "RATE_LIMIT_EXCEEDED");
    }

    #[test]
    fn unknown_connection_is_ignored() {
        let hub = Hub::new(settings());
        assert!(hub.handle_inbound("ghost", "ping", &json!({})).is_none());
    }

    #[test]
    fn invalid_wallet_on_subscribe_yields_bad_request() {
        let hub = Hub::new(settings());
        hub.accept("c1".into(), Arc::new(RecordingSink::default()));
        let reply = hub.handle_inbound("c1", "subscribe", &json!({"wallet": "not-an-address"})).unwrap();
        assert_eq!(reply["type"], "error");
        assert_eq!(reply["data"]["code"], "BAD_REQUEST");
    }

    #[test]
    fn remove_drops_connection() {
        let hub = Hub::new(settings());
        hub.accept("c1".into(), Arc::new(RecordingSink::default()));
        assert_eq!(hub.connection_count(), 1);
        hub.remove("c1");
        assert_eq!(hub.connection_count(), 0);
    }
}
