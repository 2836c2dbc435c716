//! # Generic Collection Routes
//!
//! Every entry of the collection catalog gets the same five endpoints:
//!
//! - `GET /api/{path}` — list with search, filters and pagination
//! - `POST /api/{path}` — create
//! - `GET /api/{path}/:id` — fetch one (soft-deleted documents included)
//! - `PUT /api/{path}/:id` — partial update
//! - `DELETE /api/{path}/:id` — hard or soft delete, per the schema
//!
//! Field handling is entirely schema-driven: [`normalize_input`] on the way
//! in, [`shape_output`] on the way out. Uniqueness checks run under the
//! store's write lock together with the write they guard.

use std::collections::HashMap;

use agency_core::derive::apply_derived;
use agency_core::schema::{
    check_not_blanked, check_required, fold_aliases, get_str_any, normalize_input, shape_output,
    unique_key,
};
use agency_core::temporal::now_rfc3339;
use agency_core::{catalog, DocId, EntitySchema};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::extractors::{extract_json, parse_id};
use crate::state::AppState;
use crate::store::{doc_id, Document, StoreTx};

/// Query keys with fixed meaning on list endpoints.
const RESERVED_PARAMS: &[&str] = &["page", "limit", "search", "status", "includeInactive"];

// ── Router ──────────────────────────────────────────────────────────

/// CRUD routes for every catalog collection.
pub fn router() -> Router<AppState> {
    catalog()
        .iter()
        .fold(Router::new(), |router, schema| router.merge(collection_router(schema)))
}

/// CRUD routes for one collection.
pub fn collection_router(schema: &'static EntitySchema) -> Router<AppState> {
    let base = format!("/api/{}", schema.path);
    let item = format!("{base}/:id");

    Router::new()
        .route(
            &base,
            get(
                move |State(state): State<AppState>,
                      Query(params): Query<HashMap<String, String>>| async move {
                    list(schema, &state, &params)
                },
            )
            .post(
                move |State(state): State<AppState>,
                      body: Result<Json<Value>, JsonRejection>| async move {
                    let body = extract_json(body)?;
                    let created = create_document(&state, schema, body).await?;
                    Ok::<_, AppError>((StatusCode::CREATED, Json(shape_output(schema, &created))))
                },
            ),
        )
        .route(
            &item,
            get(
                move |State(state): State<AppState>, Path(id): Path<String>| async move {
                    let doc = get_document(&state, schema, &id)?;
                    Ok::<_, AppError>(Json(shape_output(schema, &doc)))
                },
            )
            .put(
                move |State(state): State<AppState>,
                      Path(id): Path<String>,
                      body: Result<Json<Value>, JsonRejection>| async move {
                    let id = parse_id(&id)?;
                    let patch = extract_json(body)?;
                    let updated = update_document(&state, schema, &id, patch).await?;
                    Ok::<_, AppError>(Json(shape_output(schema, &updated)))
                },
            )
            .delete(
                move |State(state): State<AppState>, Path(id): Path<String>| async move {
                    let id = parse_id(&id)?;
                    delete_document(&state, schema, &id).await.map(Json)
                },
            ),
        )
}

// ── Document Predicates ─────────────────────────────────────────────

/// Whether a document has not been soft-deleted.
pub(crate) fn is_live(doc: &Document) -> bool {
    doc.get("isActive").and_then(Value::as_bool).unwrap_or(true)
}

/// Text form of a scalar field value, for matching.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First non-null value stored under any spelling of `field`.
pub(crate) fn field_value<'d>(
    schema: &EntitySchema,
    doc: &'d Document,
    field: &str,
) -> Option<&'d Value> {
    schema
        .spellings(field)
        .into_iter()
        .find_map(|name| doc.get(name).filter(|v| !v.is_null()))
}

/// Case-insensitive literal pattern for user-supplied search text.
pub(crate) fn search_pattern(text: &str) -> Result<Regex, AppError> {
    RegexBuilder::new(&regex::escape(text.trim()))
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::Internal(format!("search pattern: {e}")))
}

/// Whether any search field of `doc` matches `pattern`.
pub(crate) fn matches_search(schema: &EntitySchema, doc: &Document, pattern: &Regex) -> bool {
    schema.search_fields.iter().any(|field| {
        field_value(schema, doc, field)
            .and_then(value_text)
            .is_some_and(|text| pattern.is_match(&text))
    })
}

/// Whether `doc` references `id` through any spelling of `field`.
pub(crate) fn references(
    schema: &EntitySchema,
    doc: &Document,
    field: &str,
    id: &DocId,
) -> bool {
    get_str_any(doc, &schema.spellings(field))
        .is_some_and(|value| value.trim().eq_ignore_ascii_case(id.as_str()))
}

fn status_of(schema: &EntitySchema, doc: &Document) -> Option<String> {
    doc.get("status")
        .and_then(value_text)
        .or_else(|| {
            schema.defaults.iter().find_map(|(field, default)| {
                (*field == "status").then(|| value_text(&default.to_value())).flatten()
            })
        })
        .map(|s| s.to_lowercase())
}

// ── List ────────────────────────────────────────────────────────────

/// Parsed list query parameters.
#[derive(Debug)]
pub(crate) struct ListQuery {
    pub page: usize,
    pub limit: usize,
    pub search: Option<Regex>,
    pub status: Option<String>,
    pub filters: Vec<(&'static str, String)>,
    pub include_inactive: bool,
}

impl ListQuery {
    /// Parse raw query parameters. Unparsable paging values fall back to
    /// the defaults; unknown keys are ignored.
    pub(crate) fn parse(
        schema: &'static EntitySchema,
        params: &HashMap<String, String>,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        let number = |key: &str| {
            params
                .get(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n >= 1)
        };
        let page = number("page").unwrap_or(1);
        let limit = number("limit")
            .unwrap_or(config.page_size)
            .clamp(1, config.max_page_size);

        let search = match params.get("search").map(|s| s.trim()) {
            Some(text) if !text.is_empty() => Some(search_pattern(text)?),
            _ => None,
        };

        let status = params
            .get("status")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty() && s != "all");

        let mut filters = Vec::new();
        for (key, value) in params {
            if RESERVED_PARAMS.contains(&key.as_str()) || value.trim().is_empty() {
                continue;
            }
            let canonical = schema.canonical_name(key);
            if let Some(field) = schema.filters.iter().find(|f| **f == canonical) {
                filters.push((*field, value.trim().to_lowercase()));
            }
        }

        let include_inactive = params
            .get("includeInactive")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        Ok(Self {
            page,
            limit,
            search,
            status,
            filters,
            include_inactive,
        })
    }

    /// Whether `doc` is selected by this query.
    pub(crate) fn matches(&self, schema: &EntitySchema, doc: &Document) -> bool {
        let wants_inactive = self.include_inactive || self.status.as_deref() == Some("inactive");
        if schema.soft_delete() && !wants_inactive && !is_live(doc) {
            return false;
        }

        if let Some(status) = &self.status {
            if status_of(schema, doc).as_deref() != Some(status.as_str()) {
                return false;
            }
        }

        for (field, wanted) in &self.filters {
            let stored = field_value(schema, doc, field).and_then(value_text);
            if stored.map(|s| s.trim().to_lowercase()).as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }

        match &self.search {
            Some(pattern) => matches_search(schema, doc, pattern),
            None => true,
        }
    }
}

fn list(
    schema: &'static EntitySchema,
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<Json<Value>, AppError> {
    let query = ListQuery::parse(schema, params, &state.config)?;
    let docs = state.store.find(schema.name, |doc| query.matches(schema, doc));

    let total = docs.len();
    let data: Vec<Value> = docs
        .iter()
        .skip((query.page - 1).saturating_mul(query.limit))
        .take(query.limit)
        .map(|doc| shape_output(schema, doc))
        .collect();

    Ok(Json(json!({
        "data": data,
        "pagination": {
            "page": query.page,
            "limit": query.limit,
            "total": total,
            "totalPages": total.div_ceil(query.limit),
        },
    })))
}

// ── Writes ──────────────────────────────────────────────────────────

/// Fetch one document by a raw path id.
pub(crate) fn get_document(
    state: &AppState,
    schema: &EntitySchema,
    raw_id: &str,
) -> Result<Document, AppError> {
    let id = parse_id(raw_id)?;
    state
        .store
        .get(schema.name, &id)
        .ok_or_else(|| AppError::not_found(schema.label))
}

/// Reject `doc` if a unique field collides with another live document.
pub(crate) fn check_unique(
    tx: &StoreTx<'_>,
    schema: &EntitySchema,
    doc: &Document,
    exclude: Option<&str>,
) -> Result<(), AppError> {
    for field in schema.unique {
        let Some(key) = field_value(schema, doc, field).and_then(unique_key) else {
            continue;
        };
        let clash = tx.iter(schema.name).any(|other| {
            is_live(other)
                && doc_id(other) != exclude
                && field_value(schema, other, field).and_then(unique_key).as_deref()
                    == Some(key.as_str())
        });
        if clash {
            return Err(AppError::Duplicate(format!(
                "a {} with this {field} already exists",
                schema.label
            )));
        }
    }
    Ok(())
}

/// Validate, store and persist a new document.
pub(crate) async fn create_document(
    state: &AppState,
    schema: &'static EntitySchema,
    body: Value,
) -> Result<Document, AppError> {
    let mut doc = normalize_input(schema, body)?;
    check_required(schema, &doc)?;

    for (field, default) in schema.defaults {
        if schema.read_only.contains(field) {
            continue;
        }
        if doc.get(*field).map_or(true, Value::is_null) {
            doc.insert(field.to_string(), default.to_value());
        }
    }
    if schema.soft_delete() {
        doc.insert("isActive".into(), Value::Bool(true));
    }
    apply_derived(schema, &mut doc)?;

    let created = state.store.with_write(|tx| {
        check_unique(tx, schema, &doc, None)?;
        Ok::<_, AppError>(tx.insert(schema.name, doc))
    })?;

    let id = doc_id(&created).unwrap_or_default().to_string();
    if let Err(err) = state.persist(schema.name, &created).await {
        if let Ok(id) = DocId::parse(&id) {
            state.store.remove(schema.name, &id);
        }
        return Err(err);
    }

    tracing::info!(collection = schema.name, %id, "document created");
    after_write(state, schema, None, Some(&created)).await;
    Ok(created)
}

/// Merge a partial update into a stored document.
pub(crate) async fn update_document(
    state: &AppState,
    schema: &'static EntitySchema,
    id: &DocId,
    body: Value,
) -> Result<Document, AppError> {
    let patch = normalize_input(schema, body)?;
    check_not_blanked(schema, &patch)?;
    let status = patch.get("status").and_then(value_text);
    let now = now_rfc3339();

    let (before, updated) = state.store.with_write(|tx| {
        let before = tx
            .get(schema.name, id)
            .cloned()
            .ok_or_else(|| AppError::not_found(schema.label))?;

        let mut merged = before.clone();
        fold_aliases(schema, &mut merged);
        merged.extend(patch);
        if schema.soft_delete() {
            if let Some(status) = &status {
                sync_active_flag(&mut merged, status, &now);
            }
        }
        apply_derived(schema, &mut merged)?;
        check_unique(tx, schema, &merged, Some(id.as_str()))?;

        let updated = tx
            .update(schema.name, id, |doc| *doc = merged)
            .ok_or_else(|| AppError::not_found(schema.label))?;
        Ok::<_, AppError>((before, updated))
    })?;

    state
        .persist_or_restore(schema.name, &updated, before.clone())
        .await?;

    tracing::info!(collection = schema.name, id = %id, "document updated");
    after_write(state, schema, Some(&before), Some(&updated)).await;
    Ok(updated)
}

/// On soft-delete collections `status` and `isActive` move together: an
/// `inactive` status deactivates, any other status reactivates.
fn sync_active_flag(doc: &mut Document, status: &str, now: &str) {
    if status.trim().eq_ignore_ascii_case("inactive") {
        doc.insert("isActive".into(), Value::Bool(false));
        if !doc.contains_key("deletedAt") {
            doc.insert("deletedAt".into(), Value::String(now.to_string()));
        }
    } else {
        doc.insert("isActive".into(), Value::Bool(true));
        doc.remove("deletedAt");
    }
}

/// Hard- or soft-delete a document according to its schema.
pub(crate) async fn delete_document(
    state: &AppState,
    schema: &'static EntitySchema,
    id: &DocId,
) -> Result<Value, AppError> {
    let before = if schema.soft_delete() {
        let now = now_rfc3339();
        let (before, updated) = state.store.with_write(|tx| {
            let before = tx
                .get(schema.name, id)
                .cloned()
                .ok_or_else(|| AppError::not_found(schema.label))?;
            let updated = tx
                .update(schema.name, id, |doc| {
                    doc.insert("isActive".into(), Value::Bool(false));
                    doc.insert("status".into(), Value::String("inactive".into()));
                    doc.insert("deletedAt".into(), Value::String(now));
                })
                .ok_or_else(|| AppError::not_found(schema.label))?;
            Ok::<_, AppError>((before, updated))
        })?;
        state
            .persist_or_restore(schema.name, &updated, before.clone())
            .await?;
        before
    } else {
        let removed = state
            .store
            .remove(schema.name, id)
            .ok_or_else(|| AppError::not_found(schema.label))?;
        if let Err(err) = state.persist_delete(schema.name, id.as_str()).await {
            state.store.replace(schema.name, removed);
            return Err(err);
        }
        removed
    };

    tracing::info!(
        collection = schema.name,
        id = %id,
        policy = schema.delete.as_str(),
        "document deleted"
    );
    after_write(state, schema, Some(&before), None).await;

    Ok(json!({
        "success": true,
        "message": format!("{} deleted successfully", schema.label),
        "id": id,
    }))
}

/// Side effects of a committed write. Never fails the write.
async fn after_write(
    state: &AppState,
    schema: &EntitySchema,
    before: Option<&Document>,
    after: Option<&Document>,
) {
    if schema.name == agency_core::catalog::PACKAGES.name {
        let agents = [before, after]
            .into_iter()
            .flatten()
            .filter_map(|doc| get_str_any(doc, &schema.spellings("agentId")))
            .map(str::to_string);
        super::agents::refresh_rollups(state, agents).await;
    }
}
