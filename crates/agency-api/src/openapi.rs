//! # OpenAPI Specification Assembly
//!
//! Hand-written routes are documented with `#[utoipa::path]` and collected
//! in [`ApiDoc`]. The generic collection routes are generated from the
//! catalog at runtime, so their operations are added to the document
//! programmatically by [`spec`]. Served at `/openapi.json`.

use agency_core::{catalog, EntitySchema};
use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::path::{
    Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItemType,
};
use utoipa::openapi::{Required, ResponseBuilder};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the hand-written routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agency ERP API",
        version = "0.3.0",
        description = "Travel and hajj / umrah agency back office: collection CRUD, agent package rollups, vendor and license sub-resources, and global search.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Agents
        crate::routes::agents::agent_packages,
        crate::routes::agents::agent_summary,
        crate::routes::agents::recalculate_agent,
        // Packages
        crate::routes::packages::assign_customers,
        // Vendors
        crate::routes::vendors::add_bank_account,
        crate::routes::vendors::remove_bank_account,
        crate::routes::vendors::vendor_bills,
        // Licenses
        crate::routes::licenses::license_stats,
        // Notifications
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mark_all_read,
        crate::routes::notifications::unread_count,
        // Personal expenses
        crate::routes::expenses::expense_summary,
        // Search
        crate::routes::search::global_search,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::routes::packages::AssignCustomersRequest,
        crate::routes::vendors::BankAccountRequest,
        crate::routes::search::SearchResponse,
    )),
    tags(
        (name = "agents", description = "Agents and their package rollup"),
        (name = "packages", description = "Hajj and umrah packages"),
        (name = "vendors", description = "Vendors, bank accounts and bills"),
        (name = "licenses", description = "Agency licenses"),
        (name = "notifications", description = "In-app notifications"),
        (name = "personal-expenses", description = "Personal expense tracking"),
        (name = "search", description = "Global search"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(spec())
}

/// The full document: [`ApiDoc`] plus one CRUD block per collection.
pub fn spec() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    for schema in catalog() {
        let base = format!("/api/{}", schema.path);
        let item = format!("/api/{}/{{id}}", schema.path);
        let ops = [
            (base.clone(), PathItemType::Get, list_operation(schema)),
            (base, PathItemType::Post, create_operation(schema)),
            (item.clone(), PathItemType::Get, item_operation(schema, "get", "Fetch", "200")),
            (item.clone(), PathItemType::Put, item_operation(schema, "update", "Partially update", "200")),
            (item, PathItemType::Delete, item_operation(schema, "delete", delete_verb(schema), "200")),
        ];
        for (path, kind, op) in ops {
            doc.paths
                .paths
                .entry(path)
                .or_default()
                .operations
                .insert(kind, op);
        }
    }
    doc
}

fn delete_verb(schema: &EntitySchema) -> &'static str {
    if schema.soft_delete() {
        "Deactivate"
    } else {
        "Delete"
    }
}

fn error_response(description: &str) -> utoipa::openapi::Response {
    ResponseBuilder::new().description(description).build()
}

fn list_operation(schema: &EntitySchema) -> Operation {
    let mut builder = OperationBuilder::new()
        .tag(schema.path)
        .summary(Some(format!("List {}", schema.path)))
        .operation_id(Some(format!("list_{}", schema.name)))
        .response(
            "200",
            ResponseBuilder::new()
                .description("{ data, pagination: { page, limit, total, totalPages } }")
                .build(),
        );
    let mut params = vec!["page", "limit", "search", "status"];
    if schema.soft_delete() {
        params.push("includeInactive");
    }
    params.extend(schema.filters.iter().copied());
    for name in params {
        builder = builder.parameter(
            ParameterBuilder::new()
                .name(name)
                .parameter_in(ParameterIn::Query)
                .required(Required::False)
                .build(),
        );
    }
    builder.build()
}

fn create_operation(schema: &EntitySchema) -> Operation {
    OperationBuilder::new()
        .tag(schema.path)
        .summary(Some(format!("Create a {}", schema.label)))
        .description(Some(format!("Required fields: {}", schema.required.join(", "))))
        .operation_id(Some(format!("create_{}", schema.name)))
        .response("201", ResponseBuilder::new().description("Created document").build())
        .response("400", error_response("Validation error or duplicate"))
        .build()
}

fn item_operation(schema: &EntitySchema, verb: &str, summary: &str, ok: &str) -> Operation {
    OperationBuilder::new()
        .tag(schema.path)
        .summary(Some(format!("{summary} a {}", schema.label)))
        .operation_id(Some(format!("{verb}_{}", schema.name)))
        .parameter(
            ParameterBuilder::new()
                .name("id")
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .description(Some("24-character document id"))
                .build(),
        )
        .response(ok, ResponseBuilder::new().description("Success").build())
        .response("400", error_response("Malformed id or invalid body"))
        .response("404", error_response("Not found"))
        .build()
}
