//! # Notification Read State
//!
//! ## Endpoints
//!
//! - `PUT /api/notifications/:id/read` — mark one notification read
//! - `PUT /api/notifications/read-all` — mark every unread notification read
//! - `GET /api/notifications/unread-count` — number of unread notifications

use agency_core::catalog::NOTIFICATIONS;
use agency_core::schema::shape_output;
use agency_core::temporal::now_rfc3339;
use agency_core::DocId;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::extractors::parse_id;
use crate::state::AppState;
use crate::store::{doc_id, Document};

/// Notification routes beyond generic CRUD.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/read-all", put(mark_all_read))
        .route("/api/notifications/unread-count", get(unread_count))
        .route("/api/notifications/:id/read", put(mark_read))
}

/// Missing `isRead` counts as unread.
fn is_unread(doc: &Document) -> bool {
    !doc.get("isRead").and_then(Value::as_bool).unwrap_or(false)
}

fn mark(doc: &mut Document, at: &str) {
    doc.insert("isRead".into(), Value::Bool(true));
    doc.insert("readAt".into(), Value::String(at.to_string()));
}

/// PUT /api/notifications/:id/read — Mark a notification read.
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Updated notification"),
        (status = 404, description = "Notification not found", body = crate::error::ErrorBody),
    ),
    tag = "notifications"
)]
pub(crate) async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let now = now_rfc3339();
    let (before, updated) = state.store.with_write(|tx| {
        let before = tx
            .get(NOTIFICATIONS.name, &id)
            .cloned()
            .ok_or_else(|| AppError::not_found(NOTIFICATIONS.label))?;
        let updated = tx
            .update(NOTIFICATIONS.name, &id, |doc| mark(doc, &now))
            .ok_or_else(|| AppError::not_found(NOTIFICATIONS.label))?;
        Ok::<_, AppError>((before, updated))
    })?;
    state
        .persist_or_restore(NOTIFICATIONS.name, &updated, before)
        .await?;
    Ok(Json(shape_output(&NOTIFICATIONS, &updated)))
}

/// PUT /api/notifications/read-all — Mark every unread notification read.
///
/// Documents are persisted one at a time. When a persist fails, that
/// document and every one not yet persisted go back to unread.
#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Number of notifications updated"),
    ),
    tag = "notifications"
)]
pub(crate) async fn mark_all_read(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let now = now_rfc3339();
    let changes: Vec<(Document, Document)> = state.store.with_write(|tx| {
        let unread: Vec<Document> = tx
            .iter(NOTIFICATIONS.name)
            .filter(|d| is_unread(d))
            .cloned()
            .collect();
        unread
            .into_iter()
            .filter_map(|before| {
                let id = doc_id(&before).and_then(|id| DocId::parse(id).ok())?;
                let after = tx.update(NOTIFICATIONS.name, &id, |doc| mark(doc, &now))?;
                Some((before, after))
            })
            .collect()
    });

    for (done, (_, after)) in changes.iter().enumerate() {
        if let Err(err) = state.persist(NOTIFICATIONS.name, after).await {
            for (before, _) in &changes[done..] {
                state.store.replace(NOTIFICATIONS.name, before.clone());
            }
            tracing::warn!(persisted = done, total = changes.len(), "read-all stopped early");
            return Err(err);
        }
    }

    tracing::info!(updated = changes.len(), "notifications marked read");
    Ok(Json(json!({ "success": true, "updated": changes.len() })))
}

/// GET /api/notifications/unread-count — Unread notification count.
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count"),
    ),
    tag = "notifications"
)]
pub(crate) async fn unread_count(State(state): State<AppState>) -> Json<Value> {
    let count = state.store.count_where(NOTIFICATIONS.name, is_unread);
    Json(json!({ "count": count }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(state: &AppState, v: Value) -> DocId {
        let stored = state.store.insert(NOTIFICATIONS.name, v.as_object().cloned().unwrap());
        DocId::parse(doc_id(&stored).unwrap()).unwrap()
    }

    #[test]
    fn missing_read_flag_is_unread() {
        assert!(is_unread(&Document::new()));
        let mut doc = Document::new();
        mark(&mut doc, "2025-01-01T00:00:00.000Z");
        assert!(!is_unread(&doc));
    }

    #[tokio::test]
    async fn failed_persist_keeps_notifications_unread() {
        let state = crate::state::unreachable_db_state();
        let first = insert(&state, json!({"title": "a", "message": "m", "isRead": false}));
        insert(&state, json!({"title": "b", "message": "m"}));

        assert!(mark_read(State(state.clone()), Path(first.to_string())).await.is_err());
        assert!(mark_all_read(State(state.clone())).await.is_err());

        let Json(count) = unread_count(State(state)).await;
        assert_eq!(count["count"], 2);
    }
}
