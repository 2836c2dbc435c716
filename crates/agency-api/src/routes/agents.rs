//! # Agent Package Rollup
//!
//! An agent's summary fields (`hajjBill`, `totalDue`, ...) are recomputed
//! from scratch from every package referencing the agent. The generic
//! package routes call [`refresh_rollups`] after each committed write;
//! failures there are logged and never fail the package write.
//!
//! ## Endpoints
//!
//! - `GET /api/agents/:id/packages` — the agent's packages
//! - `GET /api/agents/:id/summary` — freshly computed rollup, not stored
//! - `POST /api/agents/:id/recalculate` — recompute and store the rollup

use std::collections::BTreeSet;

use agency_core::catalog::{AGENTS, PACKAGES};
use agency_core::schema::shape_output;
use agency_core::temporal::now_rfc3339;
use agency_core::{AgentRollup, CoreError, DocId};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::extractors::parse_id;
use crate::routes::resources::references;
use crate::state::AppState;
use crate::store::{Document, StoreTx};

// ── Router ──────────────────────────────────────────────────────────

/// Agent sub-resource routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/agents/:id/packages", get(agent_packages))
        .route("/api/agents/:id/summary", get(agent_summary))
        .route("/api/agents/:id/recalculate", post(recalculate_agent))
}

// ── Rollup ──────────────────────────────────────────────────────────

fn rollup_for(tx: &StoreTx<'_>, agent: &DocId) -> Result<AgentRollup, CoreError> {
    AgentRollup::compute(
        tx.iter(PACKAGES.name)
            .filter(|package| references(&PACKAGES, package, "agentId", agent)),
    )
}

/// Recompute and store one agent's rollup.
///
/// The package scan and the agent write happen under one write lock. If the
/// write cannot be persisted the agent keeps its previous figures.
pub async fn recalculate(state: &AppState, agent: &DocId) -> Result<Document, AppError> {
    let now = now_rfc3339();
    let (before, updated) = state.store.with_write(|tx| {
        let before = tx
            .get(AGENTS.name, agent)
            .cloned()
            .ok_or_else(|| AppError::not_found(AGENTS.label))?;
        let fields = rollup_for(tx, agent)?.to_fields(&now);
        let updated = tx
            .update(AGENTS.name, agent, |doc| doc.extend(fields))
            .ok_or_else(|| AppError::not_found(AGENTS.label))?;
        Ok::<_, AppError>((before, updated))
    })?;

    state
        .persist_or_restore(AGENTS.name, &updated, before)
        .await?;
    Ok(updated)
}

/// Refresh the rollup of every listed agent. Unparsable ids, missing
/// agents and persistence failures are logged and skipped.
pub(crate) async fn refresh_rollups(state: &AppState, agent_ids: impl IntoIterator<Item = String>) {
    let distinct: BTreeSet<String> = agent_ids
        .into_iter()
        .map(|id| id.trim().to_ascii_lowercase())
        .filter(|id| !id.is_empty())
        .collect();

    for raw in distinct {
        let agent = match DocId::parse(&raw) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(agent_id = %raw, error = %err, "skipping rollup for malformed agent id");
                continue;
            }
        };
        match recalculate(state, &agent).await {
            Ok(_) => tracing::debug!(agent_id = %agent, "agent rollup refreshed"),
            Err(err) => tracing::warn!(agent_id = %agent, error = %err, "agent rollup refresh failed"),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/agents/:id/packages — Packages referencing the agent.
#[utoipa::path(
    get,
    path = "/api/agents/{id}/packages",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Packages of the agent, newest first"),
        (status = 400, description = "Malformed id", body = crate::error::ErrorBody),
        (status = 404, description = "Agent not found", body = crate::error::ErrorBody),
    ),
    tag = "agents"
)]
pub(crate) async fn agent_packages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let agent = parse_id(&id)?;
    state
        .store
        .get(AGENTS.name, &agent)
        .ok_or_else(|| AppError::not_found(AGENTS.label))?;

    let packages: Vec<Value> = state
        .store
        .find(PACKAGES.name, |p| references(&PACKAGES, p, "agentId", &agent))
        .iter()
        .map(|p| shape_output(&PACKAGES, p))
        .collect();

    Ok(Json(json!({ "total": packages.len(), "data": packages })))
}

/// GET /api/agents/:id/summary — Rollup computed from current packages.
#[utoipa::path(
    get,
    path = "/api/agents/{id}/summary",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Hajj, umrah and overall billed / paid / due"),
        (status = 404, description = "Agent not found", body = crate::error::ErrorBody),
        (status = 500, description = "Totals exceed the supported amount range", body = crate::error::ErrorBody),
    ),
    tag = "agents"
)]
pub(crate) async fn agent_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let agent = parse_id(&id)?;
    let now = now_rfc3339();
    let fields = state.store.with_write(|tx| {
        if tx.get(AGENTS.name, &agent).is_none() {
            return Err(AppError::not_found(AGENTS.label));
        }
        Ok(rollup_for(tx, &agent)?.to_fields(&now))
    })?;

    Ok(Json(json!({ "agentId": agent, "summary": fields })))
}

/// POST /api/agents/:id/recalculate — Recompute and store the rollup.
#[utoipa::path(
    post,
    path = "/api/agents/{id}/recalculate",
    params(("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent with refreshed summary fields"),
        (status = 404, description = "Agent not found", body = crate::error::ErrorBody),
        (status = 500, description = "Totals out of range, or the write could not be persisted", body = crate::error::ErrorBody),
    ),
    tag = "agents"
)]
pub(crate) async fn recalculate_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let agent = parse_id(&id)?;
    let updated = recalculate(&state, &agent).await?;
    tracing::info!(agent_id = %agent, "agent rollup recalculated");
    Ok(Json(shape_output(&AGENTS, &updated)))
}
