//! # Vendor Sub-Resources
//!
//! Bank accounts are embedded in the vendor document under `bankAccounts`,
//! each with its own generated `id`. Bills live in `vendor_bills` and
//! reference the vendor through `vendorId`.
//!
//! ## Endpoints
//!
//! - `POST /api/vendors/:id/bank-accounts` — add a bank account
//! - `DELETE /api/vendors/:id/bank-accounts/:accountId` — remove a bank account
//! - `GET /api/vendors/:id/bills` — the vendor's bills with totals

use agency_core::catalog::{VENDORS, VENDOR_BILLS};
use agency_core::money::{amount_or_zero, checked_total, to_json};
use agency_core::schema::shape_output;
use agency_core::temporal::now_rfc3339;
use agency_core::{CoreError, DocId};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, parse_id, Validate};
use crate::routes::resources::references;
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to add a bank account to a vendor.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountRequest {
    /// Bank name.
    #[serde(default, alias = "bank_name")]
    pub bank_name: Option<String>,
    /// Account number.
    #[serde(default, alias = "account_number")]
    pub account_number: Option<String>,
    /// Name on the account.
    #[serde(default, alias = "account_title")]
    pub account_title: Option<String>,
    /// Branch of the bank.
    #[serde(default, alias = "branch_name")]
    pub branch_name: Option<String>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Validate for BankAccountRequest {
    fn validate(&self) -> Result<(), String> {
        if filled(&self.bank_name).is_none() {
            return Err("bankName is required".to_string());
        }
        if filled(&self.account_number).is_none() {
            return Err("accountNumber is required".to_string());
        }
        Ok(())
    }
}

impl BankAccountRequest {
    fn into_account(self, id: &DocId) -> Value {
        let mut account = Map::new();
        account.insert("id".into(), Value::String(id.to_string()));
        for (key, value) in [
            ("bankName", &self.bank_name),
            ("accountNumber", &self.account_number),
            ("accountTitle", &self.account_title),
            ("branchName", &self.branch_name),
        ] {
            if let Some(v) = filled(value) {
                account.insert(key.into(), Value::String(v.to_string()));
            }
        }
        account.insert("createdAt".into(), Value::String(now_rfc3339()));
        Value::Object(account)
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Vendor sub-resource routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/vendors/:id/bank-accounts", post(add_bank_account))
        .route(
            "/api/vendors/:id/bank-accounts/:account_id",
            delete(remove_bank_account),
        )
        .route("/api/vendors/:id/bills", get(vendor_bills))
}

fn account_id(account: &Value) -> Option<&str> {
    account
        .get("id")
        .or_else(|| account.get("_id"))
        .and_then(Value::as_str)
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/vendors/:id/bank-accounts — Add an embedded bank account.
#[utoipa::path(
    post,
    path = "/api/vendors/{id}/bank-accounts",
    params(("id" = String, Path, description = "Vendor id")),
    request_body = BankAccountRequest,
    responses(
        (status = 201, description = "Bank account added; returns the account"),
        (status = 400, description = "bankName or accountNumber missing", body = crate::error::ErrorBody),
        (status = 404, description = "Vendor not found", body = crate::error::ErrorBody),
    ),
    tag = "vendors"
)]
pub(crate) async fn add_bank_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<BankAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let vendor = parse_id(&id)?;
    let req = extract_validated_json(body)?;
    let account = req.into_account(&DocId::new());

    let inserted = account.clone();
    let (before, updated) = state.store.with_write(|tx| {
        let before = tx
            .get(VENDORS.name, &vendor)
            .cloned()
            .ok_or_else(|| AppError::not_found(VENDORS.label))?;
        let updated = tx
            .update(VENDORS.name, &vendor, |doc| {
                let accounts = doc
                    .entry("bankAccounts")
                    .or_insert_with(|| Value::Array(Vec::new()));
                match accounts {
                    Value::Array(list) => list.push(inserted),
                    other => *other = Value::Array(vec![inserted]),
                }
            })
            .ok_or_else(|| AppError::not_found(VENDORS.label))?;
        Ok::<_, AppError>((before, updated))
    })?;

    state
        .persist_or_restore(VENDORS.name, &updated, before)
        .await?;
    tracing::info!(vendor_id = %vendor, "vendor bank account added");
    Ok((StatusCode::CREATED, Json(account)))
}

/// DELETE /api/vendors/:id/bank-accounts/:accountId — Remove a bank account.
#[utoipa::path(
    delete,
    path = "/api/vendors/{id}/bank-accounts/{accountId}",
    params(
        ("id" = String, Path, description = "Vendor id"),
        ("accountId" = String, Path, description = "Bank account id"),
    ),
    responses(
        (status = 200, description = "Bank account removed"),
        (status = 404, description = "Vendor or account not found", body = crate::error::ErrorBody),
    ),
    tag = "vendors"
)]
pub(crate) async fn remove_bank_account(
    State(state): State<AppState>,
    Path((id, account)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let vendor = parse_id(&id)?;
    let account = account.trim().to_ascii_lowercase();

    let (before, updated) = state.store.with_write(|tx| {
        let stored = tx
            .get(VENDORS.name, &vendor)
            .cloned()
            .ok_or_else(|| AppError::not_found(VENDORS.label))?;
        let present = stored
            .get("bankAccounts")
            .and_then(Value::as_array)
            .is_some_and(|list| list.iter().any(|a| account_id(a) == Some(account.as_str())));
        if !present {
            return Err(AppError::not_found("bank account"));
        }
        let updated = tx
            .update(VENDORS.name, &vendor, |doc| {
                if let Some(Value::Array(list)) = doc.get_mut("bankAccounts") {
                    list.retain(|a| account_id(a) != Some(account.as_str()));
                }
            })
            .ok_or_else(|| AppError::not_found(VENDORS.label))?;
        Ok::<_, AppError>((stored, updated))
    })?;

    state
        .persist_or_restore(VENDORS.name, &updated, before)
        .await?;
    tracing::info!(vendor_id = %vendor, account_id = %account, "vendor bank account removed");
    Ok(Json(json!({
        "success": true,
        "message": "bank account deleted successfully",
        "id": account,
    })))
}

/// GET /api/vendors/:id/bills — Bills of a vendor with totals.
#[utoipa::path(
    get,
    path = "/api/vendors/{id}/bills",
    params(("id" = String, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Bills plus totalAmount, totalPaid, totalDue and count"),
        (status = 404, description = "Vendor not found", body = crate::error::ErrorBody),
        (status = 500, description = "Totals exceed the supported amount range", body = crate::error::ErrorBody),
    ),
    tag = "vendors"
)]
pub(crate) async fn vendor_bills(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let vendor = parse_id(&id)?;
    state
        .store
        .get(VENDORS.name, &vendor)
        .ok_or_else(|| AppError::not_found(VENDORS.label))?;

    let bills = state
        .store
        .find(VENDOR_BILLS.name, |b| references(&VENDOR_BILLS, b, "vendorId", &vendor));

    let amount = checked_total(bills.iter().map(|b| amount_or_zero(b, "amount")))
        .ok_or(CoreError::Overflow("vendor bill"))?;
    let paid = checked_total(bills.iter().map(|b| amount_or_zero(b, "paidAmount")))
        .ok_or(CoreError::Overflow("vendor bill"))?;
    let due = amount
        .checked_sub(paid)
        .ok_or(CoreError::Overflow("vendor bill"))?;

    let data: Vec<Value> = bills.iter().map(|b| shape_output(&VENDOR_BILLS, b)).collect();
    Ok(Json(json!({
        "data": data,
        "totalAmount": to_json(amount),
        "totalPaid": to_json(paid),
        "totalDue": to_json(due),
        "count": bills.len(),
    })))
}
