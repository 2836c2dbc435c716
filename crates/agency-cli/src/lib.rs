//! # agency-cli — Operator Tooling for the Agency ERP
//!
//! Provides the `agency` command-line interface. Every subcommand works
//! against the Postgres database named by `DATABASE_URL` (or the
//! `database_url` key of the YAML file given with `--config`).
//!
//! ## Subcommands
//!
//! - `agency recompute-rollups` — recompute every agent's package rollup.
//! - `agency audit-unique` — report live documents sharing a unique value.
//! - `agency export --collection <name>` — dump a collection as JSON.

pub mod audit;
pub mod export;
pub mod rollups;

use std::path::Path;

use agency_api::config::AppConfig;
use agency_api::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;

/// Load configuration, with `config_file` taking the place of `AGENCY_CONFIG`.
pub fn load_config(config_file: Option<&Path>) -> Result<AppConfig> {
    let override_path = config_file.map(|p| p.to_string_lossy().into_owned());
    AppConfig::from_sources(|key| match (key, &override_path) {
        ("AGENCY_CONFIG", Some(path)) => Some(path.clone()),
        _ => std::env::var(key).ok(),
    })
    .context("failed to load configuration")
}

/// Connect to the configured database. A database is mandatory here.
pub async fn connect(config: &AppConfig) -> Result<PgPool> {
    if config.database_url.is_none() {
        anyhow::bail!("DATABASE_URL is not set; the agency CLI operates on the persisted database");
    }
    agency_api::db::init_pool(config)
        .await
        .context("failed to connect to the database")?
        .context("database pool was not created")
}

/// Connect and load every persisted document into a fresh [`AppState`].
pub async fn open_state(config: AppConfig) -> Result<AppState> {
    let pool = connect(&config).await?;
    let state = AppState::with_pool(config, Some(pool));
    state
        .hydrate_from_db()
        .await
        .context("failed to load documents from the database")?;
    Ok(state)
}
