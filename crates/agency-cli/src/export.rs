//! # Export Subcommand
//!
//! Writes one collection, as the API would return it, to a file or stdout
//! as a pretty-printed JSON array. Reads straight from the database.

use std::io::Write;
use std::path::{Path, PathBuf};

use agency_api::config::AppConfig;
use agency_api::db::documents::load_collection;
use agency_core::schema::shape_output;
use agency_core::{catalog, lookup, lookup_path, CoreError, EntitySchema};
use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};

/// Arguments for the `agency export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Collection name (`air_tickets`) or URL segment (`air-tickets`).
    #[arg(long)]
    pub collection: String,

    /// Output file. Defaults to stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Resolve a collection by name or URL segment.
pub fn resolve_collection(name: &str) -> Result<&'static EntitySchema> {
    let name = name.trim();
    lookup(name).or_else(|| lookup_path(name)).ok_or_else(|| {
        let known: Vec<&str> = catalog().iter().map(|s| s.name).collect();
        CoreError::UnknownCollection(format!("{name:?} (expected one of: {})", known.join(", "))).into()
    })
}

/// Render documents as the API shapes them.
pub fn render(schema: &EntitySchema, docs: &[Map<String, Value>]) -> Result<String> {
    let shaped: Vec<Value> = docs.iter().map(|d| shape_output(schema, d)).collect();
    serde_json::to_string_pretty(&shaped).context("failed to serialize export")
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").context("failed to write to stdout")
        }
    }
}

/// Execute the export subcommand.
pub async fn run_export(args: &ExportArgs, config: AppConfig) -> Result<u8> {
    let schema = resolve_collection(&args.collection)?;
    let pool = crate::connect(&config).await?;
    let docs = load_collection(&pool, schema.name)
        .await
        .with_context(|| format!("failed to read {}", schema.name))?;

    write_output(args.output.as_deref(), &render(schema, &docs)?)?;
    tracing::info!(collection = schema.name, documents = docs.len(), "export complete");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_names_and_paths() {
        assert_eq!(resolve_collection("air_tickets").unwrap().name, "air_tickets");
        assert_eq!(resolve_collection("air-tickets").unwrap().name, "air_tickets");
        let err = resolve_collection("spaceships").unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::UnknownCollection(_))));
        assert!(err.to_string().contains("unknown collection: \"spaceships\""));
    }

    #[test]
    fn render_shapes_documents() {
        let schema = resolve_collection("agents").unwrap();
        let docs = vec![json!({"_id": "65a1b2c3d4e5f60718293a4b", "trade_name": "Al Noor"})
            .as_object()
            .cloned()
            .unwrap()];
        let text = render(schema, &docs).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["id"], "65a1b2c3d4e5f60718293a4b");
        assert_eq!(parsed[0]["tradeName"], "Al Noor");
        assert_eq!(parsed[0]["isActive"], true);
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_output(Some(&path), "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
