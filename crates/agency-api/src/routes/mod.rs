//! # API Route Modules
//!
//! - `resources` — generic CRUD for every catalog collection.
//! - `agents` — agent package listing and the package rollup.
//! - `packages` — customer assignment.
//! - `vendors` — embedded bank accounts and vendor bills.
//! - `licenses` — expiry statistics.
//! - `notifications` — read state and unread count.
//! - `expenses` — personal expense summary.
//! - `search` — global search across seven collections.

pub mod agents;
pub mod expenses;
pub mod licenses;
pub mod notifications;
pub mod packages;
pub mod resources;
pub mod search;
pub mod vendors;

use axum::Router;

use crate::state::AppState;

/// Every `/api` route.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(resources::router())
        .merge(agents::router())
        .merge(packages::router())
        .merge(vendors::router())
        .merge(licenses::router())
        .merge(notifications::router())
        .merge(expenses::router())
        .merge(search::router())
}
