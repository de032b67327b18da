//! CLI command definitions and dispatch.

pub mod migrate;
pub mod reconcile;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use marquee_core::error::AppError;

/// Marquee seat booking and inventory core
#[derive(Debug, Parser)]
#[command(name = "marquee", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Reconcile showtime availability counters with ground truth
    Reconcile(reconcile::ReconcileArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Reconcile(args) => reconcile::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<marquee_core::config::AppConfig, AppError> {
    marquee_core::config::AppConfig::load(config_path)
}

/// Helper: create database pool from config
pub async fn create_db_pool(
    config: &marquee_core::config::AppConfig,
) -> Result<sqlx::PgPool, AppError> {
    let pool = marquee_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}
