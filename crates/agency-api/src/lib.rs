//! # agency-api — Agency ERP HTTP Service
//!
//! Axum service over the collection catalog defined in `agency-core`.
//!
//! ## Route Structure
//!
//! - `/api/{collection}` and `/api/{collection}/:id` — generic CRUD for each
//!   of the 25 catalog collections.
//! - `/api/agents/:id/{packages,summary,recalculate}` — agent rollup.
//! - `/api/packages/:id/assign` — customer assignment.
//! - `/api/vendors/:id/{bank-accounts,bills}` — vendor sub-resources.
//! - `/api/licenses/stats`, `/api/notifications/...`,
//!   `/api/personal-expenses/summary` — module aggregates.
//! - `/api/search` — global search.
//! - `/openapi.json` — OpenAPI document.
//! - `/health/liveness`, `/health/readiness`, `/metrics` — unauthenticated.
//!
//! ## Middleware Stack (outermost first)
//!
//! Extensions → TraceLayer → Metrics → Auth → Handler

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .layer(Extension(metrics.clone()))
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(metrics_report))
        .layer(Extension(metrics))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

async fn liveness() -> &'static str {
    "ok"
}

/// Ready when the database answers (or none is configured).
async fn readiness(State(state): State<AppState>) -> Response {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }
    "ready".into_response()
}

/// GET /metrics — Request counters and per-collection document counts.
async fn metrics_report(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> Json<serde_json::Value> {
    let documents: BTreeMap<String, usize> = state.store.counts().into_iter().collect();
    Json(json!({
        "requests": metrics.requests(),
        "clientErrors": metrics.client_errors(),
        "serverErrors": metrics.server_errors(),
        "documents": documents,
    }))
}
