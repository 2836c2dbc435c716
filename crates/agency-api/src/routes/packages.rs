//! # Package Customer Assignment
//!
//! - `POST /api/packages/:id/assign` — append hajj / umrah customers to a
//!   package's `assignedCustomers`.

use agency_core::catalog::{HAJIS, PACKAGES, UMRAHS};
use agency_core::schema::shape_output;
use agency_core::DocId;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, parse_id, Validate};
use crate::state::AppState;

/// Request to assign customers to a package.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCustomersRequest {
    /// Haji or umrah customer ids.
    #[serde(default, alias = "customer_ids")]
    pub customer_ids: Vec<String>,
}

impl Validate for AssignCustomersRequest {
    fn validate(&self) -> Result<(), String> {
        if self.customer_ids.is_empty() {
            return Err("customerIds is required".to_string());
        }
        Ok(())
    }
}

/// Package sub-resource routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/packages/:id/assign", post(assign_customers))
}

/// POST /api/packages/:id/assign — Assign customers to a package.
///
/// Ids already assigned are not repeated. Every id must name an existing
/// haji or umrah customer.
#[utoipa::path(
    post,
    path = "/api/packages/{id}/assign",
    params(("id" = String, Path, description = "Package id")),
    request_body = AssignCustomersRequest,
    responses(
        (status = 200, description = "Package with updated assignedCustomers"),
        (status = 400, description = "Malformed or unknown customer id", body = crate::error::ErrorBody),
        (status = 404, description = "Package not found", body = crate::error::ErrorBody),
    ),
    tag = "packages"
)]
pub(crate) async fn assign_customers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<AssignCustomersRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let package = parse_id(&id)?;
    let req = extract_validated_json(body)?;
    let customers = req
        .customer_ids
        .iter()
        .map(|raw| DocId::parse(raw).map_err(AppError::from))
        .collect::<Result<Vec<_>, _>>()?;

    let (before, updated) = state.store.with_write(|tx| {
        let stored = tx
            .get(PACKAGES.name, &package)
            .cloned()
            .ok_or_else(|| AppError::not_found(PACKAGES.label))?;

        if let Some(unknown) = customers
            .iter()
            .find(|c| tx.get(HAJIS.name, c).is_none() && tx.get(UMRAHS.name, c).is_none())
        {
            return Err(AppError::BadRequest(format!("customer {unknown} not found")));
        }

        let mut assigned: Vec<String> = PACKAGES
            .spellings("assignedCustomers")
            .into_iter()
            .find_map(|field| stored.get(field).and_then(Value::as_array))
            .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        for customer in &customers {
            if !assigned.iter().any(|a| a == customer.as_str()) {
                assigned.push(customer.to_string());
            }
        }

        let updated = tx
            .update(PACKAGES.name, &package, |doc| {
                doc.remove("assigned_customers");
                doc.insert(
                    "assignedCustomers".into(),
                    Value::Array(assigned.into_iter().map(Value::String).collect()),
                );
            })
            .ok_or_else(|| AppError::not_found(PACKAGES.label))?;
        Ok::<_, AppError>((stored, updated))
    })?;

    state
        .persist_or_restore(PACKAGES.name, &updated, before)
        .await?;
    tracing::info!(package_id = %package, assigned = customers.len(), "customers assigned to package");
    Ok(Json(shape_output(&PACKAGES, &updated)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::doc_id;
    use serde_json::json;

    fn insert(state: &AppState, collection: &str, v: Value) -> DocId {
        let stored = state.store.insert(collection, v.as_object().cloned().unwrap());
        DocId::parse(doc_id(&stored).unwrap()).unwrap()
    }

    #[test]
    fn empty_assignment_is_rejected() {
        let req = AssignCustomersRequest {
            customer_ids: Vec::new(),
        };
        assert_eq!(req.validate().unwrap_err(), "customerIds is required");
    }

    #[tokio::test]
    async fn failed_persist_leaves_assignment_unchanged() {
        let state = crate::state::unreachable_db_state();
        let package = insert(&state, "packages", json!({"packageName": "P", "packageType": "Hajj"}));
        let haji = insert(&state, "hajis", json!({"name": "Rahim", "mobile": "1"}));
        let before = state.store.get("packages", &package).unwrap();

        let body = Json(AssignCustomersRequest {
            customer_ids: vec![haji.to_string()],
        });
        let err = assign_customers(State(state.clone()), Path(package.to_string()), Ok(body))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(state.store.get("packages", &package).unwrap(), before);
    }
}
