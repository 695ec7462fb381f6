//! `axum` HTTP and WebSocket surface over [`super::facade::ApiFacade`].
//!
//! Every handler does nothing but parse its input, call the facade, and
//! wrap the result in the `{success, data}` envelope; all error mapping
//! happens through [`ApiError`]'s `IntoResponse` impl.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use evm_provider::ChainProvider;

use crate::config::ApiSettings;
use crate::error::ApiError;
use crate::hub::Hub;
use crate::types::RiskLevel;

use super::facade::ApiFacade;

/// Shared state handed to every route.
pub struct AppState<P: ChainProvider> {
    pub facade: Arc<ApiFacade<P>>,
    pub hub: Arc<Hub>,
}

impl<P: ChainProvider> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            facade: Arc::clone(&self.facade),
            hub: Arc::clone(&self.hub),
        }
    }
}

/// Assemble the full `axum` router: the HTTP façade, the WebSocket upgrade
/// route, and CORS/body-size middleware configured from [`ApiSettings`].
pub fn build_router<P: ChainProvider>(state: AppState<P>, settings: &ApiSettings) -> Router {
    let cors = if settings.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = settings
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/wallets/subscribe", post(subscribe::<P>))
        .route("/wallets/unsubscribe", delete(unsubscribe::<P>))
        .route("/wallets/{addr}/score", get(get_score::<P>))
        .route("/wallets/batch-score", post(batch_score::<P>))
        .route("/wallets/{addr}/flag-status", get(flag_status::<P>))
        .route("/wallets/{addr}/flag", post(flag::<P>))
        .route("/wallets/active", get(active::<P>))
        .route("/system/health", get(health::<P>))
        .route("/ws", get(websocket::<P>))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(settings.body_size_limit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    wallet: String,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
    #[serde(rename = "includeTransactions")]
    include_transactions: Option<bool>,
}

async fn subscribe<P: ChainProvider>(
    State(state): State<AppState<P>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .facade
        .subscribe(&req.wallet, req.session_id, req.include_transactions)
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

#[derive(Debug, Deserialize)]
struct UnsubscribeRequest {
    wallet: String,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

async fn unsubscribe<P: ChainProvider>(
    State(state): State<AppState<P>>,
    Json(req): Json<UnsubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.facade.unsubscribe(&req.wallet, req.session_id)?;
    Ok(Json(json!({ "success": true, "data": response })))
}

#[derive(Debug, Deserialize)]
struct ScoreQuery {
    #[serde(default)]
    refresh: bool,
}

async fn get_score<P: ChainProvider>(
    State(state): State<AppState<P>>,
    Path(addr): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.facade.get_score(&addr, query.refresh).await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

#[derive(Debug, Deserialize)]
struct BatchScoreRequest {
    wallets: Vec<String>,
}

async fn batch_score<P: ChainProvider>(
    State(state): State<AppState<P>>,
    Json(req): Json<BatchScoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.facade.batch_score(&req.wallets).await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn flag_status<P: ChainProvider>(
    State(state): State<AppState<P>>,
    Path(addr): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.facade.flag_status(&addr).await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

#[derive(Debug, Deserialize)]
struct FlagRequest {
    #[serde(rename = "riskLevel")]
    risk_level: RiskLevel,
    #[serde(rename = "reputationScore")]
    reputation_score: f64,
    reason: String,
}

async fn flag<P: ChainProvider>(
    State(state): State<AppState<P>>,
    Path(addr): Path<String>,
    Json(req): Json<FlagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .facade
        .flag(&addr, req.risk_level, req.reputation_score, &req.reason)
        .await?;
    Ok(Json(json!({ "success": true, "data": response })))
}

async fn active<P: ChainProvider>(State(state): State<AppState<P>>) -> impl IntoResponse {
    Json(json!({ "success": true, "data": state.facade.active() }))
}

async fn health<P: ChainProvider>(State(state): State<AppState<P>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "version": crate::version(),
            "activeMonitors": state.facade.active().count,
            "hubConnections": state.hub.connection_count(),
        },
    }))
}

async fn websocket<P: ChainProvider>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<P>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        crate::hub::serve_connection(state.hub, socket).await;
    })
}
