//! # Personal Expense Summary
//!
//! - `GET /api/personal-expenses/summary` — totals per category, with the
//!   category name resolved from `expense_categories`.

use std::collections::HashMap;

use agency_core::catalog::{EXPENSE_CATEGORIES, PERSONAL_EXPENSES};
use agency_core::schema::get_str;
use agency_core::ExpenseSummary;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::doc_id;

/// Personal expense routes beyond generic CRUD.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/personal-expenses/summary", get(expense_summary))
}

/// GET /api/personal-expenses/summary — Totals per category and overall.
#[utoipa::path(
    get,
    path = "/api/personal-expenses/summary",
    responses(
        (status = 200, description = "categories (largest first), grandTotal and count"),
        (status = 500, description = "Totals exceed the supported amount range", body = crate::error::ErrorBody),
    ),
    tag = "personal-expenses"
)]
pub(crate) async fn expense_summary(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let names: HashMap<String, String> = state
        .store
        .list(EXPENSE_CATEGORIES.name)
        .iter()
        .filter_map(|c| Some((doc_id(c)?.to_string(), get_str(c, "name")?.to_string())))
        .collect();
    let expenses = state.store.list(PERSONAL_EXPENSES.name);
    Ok(Json(ExpenseSummary::compute(&expenses, &names)?.to_json()))
}
