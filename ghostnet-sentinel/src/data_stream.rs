//! Optional push data-stream collaborator and its tolerant payload decoder.
//!
//! The Event Ingester prefers a push subscription over polling the chain
//! directly (§4.5). The collaborator's payload shape is underspecified
//! upstream, so the decoder here is deliberately defensive: it tries a
//! handful of documented shapes in order and falls back to "nothing useful
//! here" rather than erroring.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A subscription handle returned by [`DataStreamCollaborator::subscribe`].
/// Dropping or calling [`unsubscribe`](Self::unsubscribe) tears down delivery.
pub struct Subscription {
    id: String,
    unsubscribe_fn: Box<dyn FnOnce() + Send>,
}

impl Subscription {
    /// Build a subscription handle from an id and a teardown closure.
    pub fn new(id: impl Into<String>, unsubscribe_fn: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id: id.into(),
            unsubscribe_fn: Box::new(unsubscribe_fn),
        }
    }

    /// The subscription id assigned by the collaborator.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tear down delivery for this subscription.
    pub fn unsubscribe(self) {
        (self.unsubscribe_fn)();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// An optional external push collaborator the Event Ingester can subscribe
/// to for a given address, in preference to polling the chain.
///
/// Implementations are expected to deliver logs or structured event records
/// filtered by address; the exact wire shape of each delivered payload is not
/// fixed by this contract, hence [`decode_push_payload`] below.
#[async_trait]
pub trait DataStreamCollaborator: Send + Sync {
    /// Subscribe to push notifications for `address`. `on_data` is invoked
    /// once per delivered payload; `on_error` is invoked on any delivery
    /// failure the collaborator itself reports (not a guarantee of delivery
    /// order relative to `on_data`).
    async fn subscribe(
        &self,
        address: &str,
        on_data: Box<dyn Fn(Value) + Send + Sync>,
        on_error: Box<dyn Fn(String) + Send + Sync>,
    ) -> Result<Subscription>;

    /// Publish a computed record (e.g. a scoring result) back to the
    /// collaborator, if it supports a publish sink. Default: a no-op,
    /// since §6 documents this as optional.
    async fn publish(&self, _record: &Value) -> Result<()> {
        Ok(())
    }
}

/// Tolerantly decode a push payload of unknown shape into a list of
/// individual records, trying each documented shape in order:
///
/// 1. The payload is itself a JSON array — each element is a record.
/// 2. The payload is an object with a `logs` array — each element of that
///    array is a record.
/// 3. The payload is an object that itself looks like a single record (has a
///    `transactionHash` field) — treated as one record.
/// 4. Otherwise, nothing usable is present.
#[must_use]
pub fn decode_push_payload(payload: &Value) -> Vec<Value> {
    if let Some(items) = payload.as_array() {
        return items.clone();
    }
    if let Some(logs) = payload.get("logs").and_then(Value::as_array) {
        return logs.clone();
    }
    if payload.get("transactionHash").is_some() {
        return vec![payload.clone()];
    }
    Vec::new()
}
