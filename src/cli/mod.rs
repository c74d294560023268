//! CLI module for the shop backend
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply, revert or inspect PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Shop backend - member accounts and cart lookups
#[derive(Parser)]
#[command(name = "shop-backend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage database schema migrations
    Migrate(migrate::MigrateArgs),
}

/// Load `.env`, configuration files and environment overrides, then start logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
