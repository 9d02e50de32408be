//! Operator commands for the catalog lifecycle.
//!
//! The binary parses [`Args`], builds a [`CatalogLifecycle`] from the loaded
//! config and hands the command to [`run`]. Every command starts with a
//! catalog refresh, since the store only lives for one invocation.

use anyhow::{Context, Result};
use catalog_lifecycle::{CatalogLifecycle, LifecycleConfig};
use catalog_store::StatusFilter;
use catalog_types::{BulkOperationResult, EntityId};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "Deactivate, delete and toggle catalog entities")]
pub struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "catalog.toml")]
    pub config: PathBuf,

    /// Catalog service base URL (overrides the config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token for the catalog service
    #[arg(long, env = "CATALOG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List entities in the catalog
    List {
        /// Only active entities
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Only inactive entities
        #[arg(long)]
        inactive: bool,
    },

    /// Delete entities. Active ones are deactivated, inactive ones removed.
    Delete {
        /// One id for a single delete, several for a bulk run
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Flip the active flag of one entity
    Toggle { id: String },
}

impl Args {
    /// Loads the config file and applies the command-line overrides.
    pub fn load_config(&self) -> Result<LifecycleConfig> {
        let mut config = LifecycleConfig::load_from(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))?;
        if let Some(base_url) = &self.base_url {
            config.service.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            config.service.token = Some(token.clone());
        }
        Ok(config)
    }
}

/// Refreshes the catalog, then runs `command`, writing a report to `out`.
pub async fn run(
    command: &Command,
    lifecycle: &CatalogLifecycle,
    out: &mut impl Write,
) -> Result<()> {
    lifecycle
        .refresh()
        .await
        .context("failed to load the catalog")?;

    match command {
        Command::List { active, inactive } => {
            let filter = match (*active, *inactive) {
                (true, _) => StatusFilter::Active,
                (_, true) => StatusFilter::Inactive,
                _ => StatusFilter::All,
            };
            list(lifecycle, filter, out).await
        }
        Command::Delete { ids } => {
            let ids = parse_ids(ids)?;
            if let [id] = ids.as_slice() {
                let outcome = lifecycle
                    .delete(id)
                    .await
                    .with_context(|| format!("failed to delete {id}"))?;
                writeln!(out, "{id}: {outcome}")?;
            } else {
                let result = lifecycle
                    .bulk_delete(&ids)
                    .await
                    .context("bulk delete refused")?;
                write_bulk_report(&result, out)?;
            }
            Ok(())
        }
        Command::Toggle { id } => {
            let id = parse_ids(std::slice::from_ref(id))?.remove(0);
            let active = lifecycle
                .toggle(&id)
                .await
                .with_context(|| format!("failed to toggle {id}"))?;
            writeln!(out, "{id}: now {}", status_label(active))?;
            Ok(())
        }
    }
}

async fn list(
    lifecycle: &CatalogLifecycle,
    filter: StatusFilter,
    out: &mut impl Write,
) -> Result<()> {
    let entities = lifecycle.store().list(filter).await;
    debug!("Listing {} entities", entities.len());
    for entity in &entities {
        writeln!(
            out,
            "{}\t{}\t{} dependents\t{}",
            entity.id,
            status_label(entity.active),
            entity.dependent_count,
            entity.name
        )?;
    }
    Ok(())
}

fn write_bulk_report(result: &BulkOperationResult, out: &mut impl Write) -> Result<()> {
    for (id, outcome) in result.items() {
        writeln!(out, "{id}: {outcome}")?;
    }
    writeln!(out, "{}", result.summary())?;
    Ok(())
}

fn parse_ids(raw: &[String]) -> Result<Vec<EntityId>> {
    raw.iter()
        .map(|s| EntityId::new(s.as_str()).with_context(|| format!("invalid id {s:?}")))
        .collect()
}

fn status_label(active: bool) -> &'static str {
    if active { "active" } else { "inactive" }
}
