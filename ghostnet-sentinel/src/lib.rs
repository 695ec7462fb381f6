//! GHOSTNET Sentinel
//!
//! Continuously monitors subscribed wallet addresses on the GHOSTNET
//! protocol, scores their on-chain reputation in real time, streams score and
//! transaction updates to subscribed clients, and flags critically-risky
//! wallets on the on-chain Flag Registry.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                         SENTINEL PIPELINE                              │
//! │  ┌──────────────┐   ┌───────────────┐   ┌──────────────┐              │
//! │  │    Chain     │──▶│     Event     │──▶│   Monitor    │              │
//! │  │    Client    │   │   Ingester    │   │  Coordinator │              │
//! │  └──────────────┘   └───────────────┘   └──────┬───────┘              │
//! │                                                 │                      │
//! │                          ┌──────────────────────┼───────────────┐      │
//! │                          ▼                      ▼               ▼      │
//! │                  ┌──────────────┐       ┌──────────────┐  ┌─────────┐ │
//! │                  │   Feature    │──────▶│   Scoring    │  │  Flag   │ │
//! │                  │  Extractor   │       │   Engine     │─▶│Registry │ │
//! │                  └──────────────┘       └──────┬───────┘  └─────────┘ │
//! │                                                 │                      │
//! │                                                 ▼                      │
//! │                                         ┌──────────────┐              │
//! │                                         │  Broadcast   │              │
//! │                                         │     Hub      │              │
//! │                                         └──────────────┘              │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Domain types (events, monitors, feature vectors, scores, flags)
//! - [`error`] - Layered error types
//! - [`config`] - Configuration loading and validation
//! - [`codec`] - Address normalization/checksumming and value formatting
//! - [`features`] - Feature Extractor
//! - [`scoring`] - Scoring Engine (model inference + rule-based fallback)
//! - [`chain`] - Chain Client
//! - [`ingester`] - Event Ingester
//! - [`flag_registry`] - Flag Registry Client
//! - [`hub`] - Broadcast Hub
//! - [`coordinator`] - Monitor Coordinator
//! - [`api`] - Public API facade (sync entry points + HTTP/WebSocket routes)
//!
//! # Getting Started
//!
//! ```bash
//! cp .env.example .env
//! cargo run -- run
//! ```

#![doc(html_root_url = "https://docs.ghostnet.io/sentinel")]

pub mod chain;
pub mod codec;
pub mod config;
pub mod coordinator;
pub mod data_stream;
pub mod error;
pub mod features;
pub mod flag_registry;
pub mod hub;
pub mod ingester;
pub mod metrics;
pub mod scoring;
pub mod types;

pub mod api;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version string.
#[must_use]
pub const fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
        assert!(version().starts_with("0."));
    }
}
