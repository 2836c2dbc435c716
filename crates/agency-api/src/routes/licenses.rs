//! # License Statistics
//!
//! - `GET /api/licenses/stats` — counts by expiry state and by status.

use agency_core::catalog::LICENSES;
use agency_core::LicenseStats;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::state::AppState;

/// License sub-resource routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/licenses/stats", get(license_stats))
}

/// GET /api/licenses/stats — Expiry statistics as of today (UTC).
#[utoipa::path(
    get,
    path = "/api/licenses/stats",
    responses(
        (status = 200, description = "total, active, expired, expiringSoon and byStatus"),
    ),
    tag = "licenses"
)]
pub(crate) async fn license_stats(State(state): State<AppState>) -> Json<LicenseStats> {
    let licenses = state.store.list(LICENSES.name);
    Json(LicenseStats::compute(&licenses, Utc::now().date_naive()))
}
