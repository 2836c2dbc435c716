//! # Audit-Unique Subcommand
//!
//! The API enforces uniqueness on writes, but documents imported directly
//! into the database are not checked. This scans every collection with
//! unique fields and reports live documents that share a value.

use std::collections::BTreeMap;

use agency_api::config::AppConfig;
use agency_core::schema::{shape_output, unique_key};
use agency_core::{catalog, EntitySchema};
use anyhow::Result;
use clap::Args;
use serde_json::{Map, Value};

/// Arguments for the `agency audit-unique` subcommand.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Only audit this collection.
    #[arg(long)]
    pub collection: Option<String>,
}

/// Live documents sharing one unique value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Collection name.
    pub collection: &'static str,
    /// Unique field.
    pub field: &'static str,
    /// Normalized shared value.
    pub value: String,
    /// Ids of the colliding documents.
    pub ids: Vec<String>,
}

/// Find uniqueness violations among `docs` of one collection.
/// Soft-deleted documents are ignored.
pub fn find_violations(schema: &'static EntitySchema, docs: &[Map<String, Value>]) -> Vec<Violation> {
    let shaped: Vec<Value> = docs
        .iter()
        .map(|doc| shape_output(schema, doc))
        .filter(|doc| doc.get("isActive").and_then(Value::as_bool).unwrap_or(true))
        .collect();

    let mut violations = Vec::new();
    for field in schema.unique {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for doc in &shaped {
            let Some(key) = doc.get(*field).and_then(unique_key) else {
                continue;
            };
            let id = doc.get("id").and_then(Value::as_str).unwrap_or("?").to_string();
            groups.entry(key).or_default().push(id);
        }
        for (value, ids) in groups {
            if ids.len() > 1 {
                violations.push(Violation {
                    collection: schema.name,
                    field: *field,
                    value,
                    ids,
                });
            }
        }
    }
    violations
}

/// Execute the audit-unique subcommand.
///
/// Returns exit code: 0 when clean, 1 if any violation was found.
pub async fn run_audit(args: &AuditArgs, config: AppConfig) -> Result<u8> {
    let schemas: Vec<&'static EntitySchema> = match &args.collection {
        Some(name) => vec![crate::export::resolve_collection(name)?],
        None => catalog().iter().copied().filter(|s| !s.unique.is_empty()).collect(),
    };

    let state = crate::open_state(config).await?;

    let mut total = 0usize;
    for schema in schemas {
        let docs = state.store.list(schema.name);
        let violations = find_violations(schema, &docs);
        tracing::info!(collection = schema.name, documents = docs.len(), violations = violations.len(), "audited");
        for v in &violations {
            println!("{}.{} = {:?}: {}", v.collection, v.field, v.value, v.ids.join(", "));
        }
        total += violations.len();
    }

    if total == 0 {
        println!("no uniqueness violations");
        Ok(0)
    } else {
        println!("{total} uniqueness violation(s)");
        Ok(1)
    }
}
