//! # Global Search
//!
//! `GET /api/search?q=&limit=` fans one case-insensitive literal pattern out
//! over seven collections. Each category is queried on its own: a failing
//! category is logged, comes back empty, and is named in `errors`, while
//! the others still return results.

use std::collections::HashMap;

use agency_core::catalog::{AGENTS, AIR_CUSTOMERS, AIR_TICKETS, HAJIS, TRANSACTIONS, UMRAHS, VENDORS};
use agency_core::schema::shape_output;
use agency_core::EntitySchema;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::config::MAX_SEARCH_LIMIT;
use crate::error::AppError;
use crate::routes::resources::{is_live, matches_search, search_pattern};
use crate::state::AppState;

/// Response key and collection of each searched category, in response order.
pub static SEARCH_CATEGORIES: [(&str, &EntitySchema); 7] = [
    ("transactions", &TRANSACTIONS),
    ("hajis", &HAJIS),
    ("umrahs", &UMRAHS),
    ("airCustomers", &AIR_CUSTOMERS),
    ("airTickets", &AIR_TICKETS),
    ("vendors", &VENDORS),
    ("agents", &AGENTS),
];

/// Search query parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free text. Matched literally, case-insensitively.
    #[serde(default)]
    pub q: Option<String>,
    /// Per-category cap (default from configuration, at most 50).
    #[serde(default)]
    pub limit: Option<String>,
}

/// Search response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    /// The trimmed query text.
    pub query: String,
    /// Matching documents per category, newest first.
    #[schema(value_type = Object)]
    pub results: Map<String, Value>,
    /// Number of matches returned per category.
    pub counts: HashMap<String, usize>,
    /// Sum of `counts`.
    pub total: usize,
    /// Categories whose query failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl SearchResponse {
    fn empty(query: String) -> Self {
        let mut results = Map::new();
        let mut counts = HashMap::new();
        for (category, _) in SEARCH_CATEGORIES.iter() {
            results.insert(category.to_string(), Value::Array(Vec::new()));
            counts.insert(category.to_string(), 0);
        }
        Self {
            query,
            results,
            counts,
            total: 0,
            errors: Vec::new(),
        }
    }
}

/// Search routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(global_search))
}

/// Run `query` against every category, isolating per-category failures.
pub(crate) fn fan_out<F>(query: String, mut run: F) -> SearchResponse
where
    F: FnMut(&'static EntitySchema) -> Result<Vec<Value>, AppError>,
{
    let mut response = SearchResponse::empty(query);
    for &(category, schema) in SEARCH_CATEGORIES.iter() {
        match run(schema) {
            Ok(hits) => {
                response.total += hits.len();
                response.counts.insert(category.to_string(), hits.len());
                response.results.insert(category.to_string(), Value::Array(hits));
            }
            Err(err) => {
                tracing::warn!(category, error = %err, "search category failed");
                response.errors.push(category.to_string());
            }
        }
    }
    response
}

fn search_collection(
    state: &AppState,
    schema: &'static EntitySchema,
    pattern: &Regex,
    limit: usize,
) -> Result<Vec<Value>, AppError> {
    Ok(state
        .store
        .find(schema.name, |doc| is_live(doc) && matches_search(schema, doc, pattern))
        .iter()
        .take(limit)
        .map(|doc| shape_output(schema, doc))
        .collect())
}

/// GET /api/search — Search transactions, pilgrims, air customers and
/// tickets, vendors and agents.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Results keyed by category", body = SearchResponse),
    ),
    tag = "search"
)]
pub(crate) async fn global_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Ok(Json(SearchResponse::empty(query)));
    }

    let limit = params
        .limit
        .and_then(|l| l.trim().parse::<usize>().ok())
        .filter(|l| *l >= 1)
        .unwrap_or(state.config.search_limit)
        .min(MAX_SEARCH_LIMIT);

    let pattern = search_pattern(&query)?;
    let response = fan_out(query, |schema| search_collection(&state, schema, &pattern, limit));
    tracing::debug!(total = response.total, failed = response.errors.len(), "global search");
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_lists_every_category() {
        let response = SearchResponse::empty(String::new());
        assert_eq!(response.results.len(), 7);
        assert!(response.counts.values().all(|c| *c == 0));
        assert_eq!(response.total, 0);
    }

    #[test]
    fn failing_category_is_isolated() {
        let response = fan_out("x".into(), |schema| {
            if schema.name == "vendors" {
                Err(AppError::Internal("boom".into()))
            } else {
                Ok(vec![Value::from(schema.name)])
            }
        });
        assert_eq!(response.total, 6);
        assert_eq!(response.errors, vec!["vendors".to_string()]);
        assert_eq!(response.results["vendors"], Value::Array(Vec::new()));
        assert_eq!(response.counts["agents"], 1);
    }

    #[test]
    fn search_skips_soft_deleted() {
        let state = AppState::new();
        for (name, active) in [("Rahim", true), ("Rahima", false)] {
            let doc = serde_json::json!({"name": name, "mobile": "1", "isActive": active});
            state.store.insert("hajis", doc.as_object().cloned().unwrap());
        }
        let pattern = search_pattern("rahim").unwrap();
        let hits = search_collection(&state, &HAJIS, &pattern, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["name"], "Rahim");
    }
}
