//! Public API facade: sync-shaped entry points plus the `axum` HTTP and
//! WebSocket surface that exposes them.
//!
//! [`facade`] has no `axum` types in its signatures, so it is independently
//! unit-testable; [`http`] is the thin translation layer that turns facade
//! results into HTTP responses and status codes.

mod facade;
mod http;

pub use facade::{
    ActiveResponse, ApiFacade, BatchScoreResponse, FlagResponse, FlagStatusResponse,
    ScoreResponse, SubscribeResponse, UnsubscribeResponse, MAX_BATCH_SIZE,
};
pub use http::{build_router, AppState};
