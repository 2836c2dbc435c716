//! # agency-core — Foundational Types for the Agency ERP
//!
//! Pure types and routines shared by the HTTP service and the operator CLI.
//! Nothing in this crate performs I/O.
//!
//! ## Layout
//!
//! - [`identity`]: the 24-character [`DocId`] every document is addressed by.
//! - [`schema`] and [`catalog`]: one declarative [`EntitySchema`] per
//!   collection, and the single mapping layer that folds field aliases,
//!   coerces numbers and fills response defaults.
//! - [`money`] and [`temporal`]: decimal amounts and date parsing.
//! - [`derive`], [`rollup`] and [`stats`]: server-computed fields, the agent
//!   package rollup, license statistics and the expense summary.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `agency-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod catalog;
pub mod derive;
pub mod error;
pub mod identity;
pub mod money;
pub mod rollup;
pub mod schema;
pub mod stats;
pub mod temporal;

pub use catalog::{catalog, lookup, lookup_path};
pub use error::{CoreError, ValidationError};
pub use identity::DocId;
pub use rollup::{AgentRollup, PackageKind};
pub use schema::{DeletePolicy, EntitySchema};
pub use stats::{ExpenseSummary, LicenseStats};
