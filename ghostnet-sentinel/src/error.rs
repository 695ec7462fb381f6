//! Layered error types for Ghostnet Sentinel.
//!
//! - [`DomainError`] - business-rule violations (invalid address, bad risk level, ...)
//! - [`InfraError`] - infrastructure failures (RPC, transport, serialization, config)
//! - [`AppError`] - unifies both for internal `Result<T>` plumbing
//! - [`ApiError`] - HTTP boundary errors with status codes
//!
//! Domain errors are recoverable and safe to show to callers. Infrastructure
//! errors are logged in full but their details are hidden behind a generic
//! message at the API boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Business-rule violations. Recoverable and safe to surface to callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DomainError {
    /// Address failed checksum/length/hex validation.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Risk level value outside `{LOW, MEDIUM, HIGH, CRITICAL}`.
    #[error("invalid risk level: {0}")]
    InvalidRiskLevel(String),

    /// Reputation score outside `[0, 100]`.
    #[error("invalid score: {0} is outside [0, 100]")]
    InvalidScore(f64),

    /// No monitor registered for this address.
    #[error("wallet not monitored: {0}")]
    MonitorNotFound(String),

    /// The on-chain contract already holds a valid flag for this wallet.
    #[error("wallet already flagged: {0}")]
    AlreadyFlagged(String),

    /// Batch request exceeded the per-request wallet limit.
    #[error("batch too large: {0} wallets exceeds the limit of {1}")]
    BatchTooLarge(usize, usize),

    /// A connection attempted to exceed `MAX_SUBS_PER_CONN`.
    #[error("subscription limit exceeded: {0} exceeds the limit of {1}")]
    TooManySubscriptions(usize, usize),

    /// The Flag Registry is not configured (no `CONTRACT_ADDRESS`).
    #[error("flag registry not configured")]
    FlagRegistryNotConfigured,

    /// Write operations attempted without a signer configured.
    #[error("signer not configured, running read-only")]
    SignerNotConfigured,
}

// ═══════════════════════════════════════════════════════════════════════════════
// INFRASTRUCTURE ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Infrastructure-level errors from external systems.
///
/// These are logged in full but their details are hidden from API callers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InfraError {
    /// Chain RPC call failed (after retry budget exhausted, where applicable).
    #[error("chain RPC error: {0}")]
    Rpc(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Contract call reverted or was rejected for a reason other than
    /// "already flagged" / "not flagged".
    #[error("contract rejected call: {0}")]
    ContractRejected(String),

    /// WebSocket / transport-level failure talking to a downstream client.
    #[error("transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Model artifact (ONNX file, scaler, feature list, blacklist) failed to load.
    #[error("model artifact error: {0}")]
    ModelArtifact(String),

    /// Configuration error surfaced by the `config` crate.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Operation exceeded its deadline.
    #[error("operation timed out: {0}")]
    Timeout(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// APPLICATION ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Crate-wide error type. Used as the `E` in the crate's `Result` alias.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    /// Domain logic error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure error.
    #[error(transparent)]
    Infra(#[from] InfraError),

    /// The chain view looks internally inconsistent (e.g. a receipt referencing
    /// a block the client can no longer see).
    #[error("chain state looks inconsistent: {0}")]
    ReorgLike(String),

    /// Configuration failed `Settings::validate`.
    #[error("configuration error: {0}")]
    Config(String),

    /// Startup failed to initialize a mandatory collaborator.
    #[error("initialization error: {0}")]
    Initialization(String),

    /// Graceful shutdown was requested.
    #[error("shutdown requested")]
    ShutdownRequested,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, AppError>;

// ═══════════════════════════════════════════════════════════════════════════════
// API ERRORS (HTTP-specific)
// ═══════════════════════════════════════════════════════════════════════════════

/// HTTP-boundary error type, convertible into an `axum` response.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Wrapped application error.
    #[error(transparent)]
    App(#[from] AppError),

    /// Per-connection or per-client rate limit exceeded.
    #[error("rate limited: retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds until the caller may retry.
        retry_after_secs: u64,
    },

    /// Malformed request body or query parameters.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Internal error with a source kept for logging but hidden from the caller.
    #[error("internal error")]
    Internal(#[source] eyre::Report),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::App(AppError::Domain(
                DomainError::MonitorNotFound(_) | DomainError::FlagRegistryNotConfigured,
            )) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),

            Self::App(AppError::Domain(
                DomainError::InvalidAddress(_)
                | DomainError::InvalidRiskLevel(_)
                | DomainError::InvalidScore(_)
                | DomainError::BatchTooLarge(..)
                | DomainError::TooManySubscriptions(..),
            ))
            | Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", self.to_string()),

            Self::App(AppError::Domain(DomainError::AlreadyFlagged(_))) => {
                (StatusCode::CONFLICT, "CONFLICT", self.to_string())
            }

            Self::App(AppError::Domain(DomainError::SignerNotConfigured)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SIGNER_NOT_CONFIGURED",
                self.to_string(),
            ),

            Self::RateLimited { retry_after_secs } => {
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("Retry-After", retry_after_secs.to_string())],
                    Json(json!({
                        "success": false,
                        "error": self.to_string(),
                        "data": {
                            "code": "RATE_LIMITED",
                            "message": self.to_string(),
                            "retryAfterSecs": retry_after_secs,
                        },
                        "requestId": request_id(),
                        "timestamp": now_ms(),
                    })),
                )
                    .into_response();
            }

            Self::App(
                AppError::Infra(_)
                | AppError::ReorgLike(_)
                | AppError::Config(_)
                | AppError::Initialization(_)
                | AppError::ShutdownRequested,
            )
            | Self::Internal(_) => {
                tracing::error!(error = ?self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "success": false,
                "error": message,
                "data": {
                    "code": code,
                    "message": message,
                },
                "requestId": request_id(),
                "timestamp": now_ms(),
            })),
        )
            .into_response()
    }
}

fn request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_display() {
        let err = DomainError::MonitorNotFound("0xabc".into());
        assert!(err.to_string().contains("0xabc"));
    }

    #[test]
    fn app_error_from_domain() {
        let domain = DomainError::InvalidScore(150.0);
        let app: AppError = domain.into();
        assert!(matches!(
            app,
            AppError::Domain(DomainError::InvalidScore(_))
        ));
    }

    #[test]
    fn api_error_wraps_app_error() {
        let app = AppError::Domain(DomainError::AlreadyFlagged("0xabc".into()));
        let api: ApiError = app.into();
        assert!(matches!(api, ApiError::App(_)));
    }
}
