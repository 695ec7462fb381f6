//! `ClientConnection` metadata — state for one live downstream client.
//!
//! The transport handle itself (the outbound sender half of a WebSocket
//! split, or a test double) is kept by the Hub alongside this metadata
//! rather than on this type, so the metadata stays transport-agnostic and
//! directly testable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Sliding-window message counter used for per-connection rate limiting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateWindow {
    /// Start of the current window, milliseconds since epoch.
    pub window_start_ms: u64,
    /// Messages accepted in the current window.
    pub count: u32,
}

impl RateWindow {
    /// A fresh window starting now.
    #[must_use]
    pub const fn starting_at(now_ms: u64) -> Self {
        Self {
            window_start_ms: now_ms,
            count: 0,
        }
    }

    /// Record one message, rolling the window over if it has expired.
    /// Returns `true` if the message is accepted, `false` if it would exceed
    /// `max_messages` within `window_ms`.
    pub fn try_record(&mut self, now_ms: u64, window_ms: u64, max_messages: u32) -> bool {
        if now_ms.saturating_sub(self.window_start_ms) >= window_ms {
            self.window_start_ms = now_ms;
            self.count = 0;
        }
        if self.count >= max_messages {
            return false;
        }
        self.count += 1;
        true
    }
}

/// Metadata for one live downstream client connection.
///
/// `|subscribed_wallets| <= MAX_SUBS_PER_CONN` at all times; subscribed
/// addresses are stored in normalized lowercase form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConnectionMeta {
    /// Opaque connection id, generated on accept.
    pub id: String,
    /// Wallets this connection is currently subscribed to (canonical form).
    pub subscribed_wallets: HashSet<String>,
    /// When the connection was accepted, milliseconds since epoch.
    pub connected_at_ms: u64,
    /// Last time any message was received from, or sent to, this connection.
    pub last_activity_ms: u64,
    /// Optional client-supplied session id, echoed back on subscribe acks.
    pub session_id: Option<String>,
    /// Sliding-window rate-limit state for inbound messages.
    pub rate_window: RateWindow,
}

impl ClientConnectionMeta {
    /// Create connection metadata for a newly-accepted connection.
    #[must_use]
    pub fn new(id: String, now_ms: u64) -> Self {
        Self {
            id,
            subscribed_wallets: HashSet::new(),
            connected_at_ms: now_ms,
            last_activity_ms: now_ms,
            session_id: None,
            rate_window: RateWindow::starting_at(now_ms),
        }
    }

    /// Whether adding one more subscription would violate `max_subs`.
    #[must_use]
    pub fn can_subscribe_more(&self, max_subs: usize) -> bool {
        self.subscribed_wallets.len() < max_subs
    }

    /// Whether this connection has been idle longer than `timeout_ms`.
    #[must_use]
    pub fn is_idle(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) > timeout_ms
    }
}
