//! # Recompute-Rollups Subcommand
//!
//! Rebuilds the summary fields of every agent from its packages and writes
//! them back. Useful after bulk imports that bypassed the API.

use agency_api::config::AppConfig;
use agency_api::routes::agents::recalculate;
use agency_core::catalog::AGENTS;
use agency_core::schema::get_str;
use agency_core::DocId;
use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the `agency recompute-rollups` subcommand.
#[derive(Args, Debug)]
pub struct RollupArgs {
    /// Only recompute this agent.
    #[arg(long, value_name = "AGENT_ID")]
    pub agent: Option<String>,
}

/// Execute the recompute-rollups subcommand.
///
/// Returns exit code: 0 when every agent was updated, 1 if any failed.
pub async fn run_rollups(args: &RollupArgs, config: AppConfig) -> Result<u8> {
    let state = crate::open_state(config).await?;

    let agents: Vec<DocId> = match &args.agent {
        Some(raw) => vec![DocId::parse(raw).with_context(|| format!("invalid agent id {raw:?}"))?],
        None => state
            .store
            .list(AGENTS.name)
            .iter()
            .filter_map(|doc| get_str(doc, "_id").and_then(|id| DocId::parse(id).ok()))
            .collect(),
    };

    let mut failed = 0usize;
    for agent in &agents {
        match recalculate(&state, agent).await {
            Ok(doc) => println!(
                "{agent}  packages={}  due={}",
                doc.get("totalPackages").cloned().unwrap_or_default(),
                doc.get("totalDue").cloned().unwrap_or_default(),
            ),
            Err(e) => {
                failed += 1;
                tracing::error!(agent_id = %agent, "rollup failed: {e}");
            }
        }
    }

    println!("recomputed {} of {} agents", agents.len() - failed, agents.len());
    Ok(if failed == 0 { 0 } else { 1 })
}
