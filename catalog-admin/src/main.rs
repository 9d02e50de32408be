//! Catalog lifecycle CLI
//!
//! Talks to the catalog service configured in `catalog.toml` (or the
//! `--config` path) and runs one command per invocation.
//!
//! Usage:
//!   catalog-admin list --inactive
//!   catalog-admin delete cat-1 cat-2 cat-3
//!   catalog-admin toggle cat-1

use anyhow::{Context, Result};
use catalog_admin::{run, Args};
use catalog_lifecycle::CatalogLifecycle;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = args.load_config()?;
    info!("Using catalog service at {}", config.service.base_url);

    let lifecycle =
        CatalogLifecycle::connect(&config).context("failed to create the catalog client")?;
    let mut stdout = std::io::stdout().lock();
    run(&args.command, &lifecycle, &mut stdout).await
}
