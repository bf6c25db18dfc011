mod config;
mod employees;
mod http;
#[cfg(test)]
mod testing;

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_db::{DbPool, SeaOrmEmployees};
use platform_obs::{MetricsRegistry, ObsConfig, init_tracing};
use tracing::{error, info};

use crate::{
    config::{AppConfig, LISTEN_PORT},
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "employees-server", version, about = "Employees CRUD service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve(ServeCommand),
    /// Check that the database is reachable, then exit.
    CheckDb,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
}

impl Default for ServeCommand {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load()?);
    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeCommand::default()))
    {
        Command::Serve(cmd) => run_server(cmd, config).await,
        Command::CheckDb => check_db(&config).await,
    }
}

async fn setup_pool(config: &AppConfig) -> Result<DbPool> {
    platform_db::connect(&config.database)
        .await
        .context("failed to configure database pool")
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>) -> Result<()> {
    let pool = setup_pool(&config).await?;
    match platform_db::ping(&pool).await {
        Ok(()) => info!(
            host = %config.database.host,
            database = %config.database.database,
            "connected to PostgreSQL"
        ),
        Err(err) => error!(error = %err, "database connection failed; requests will report errors"),
    }

    let metrics = MetricsRegistry::new().context("failed to build metrics registry")?;
    let state = AppState {
        store: Arc::new(SeaOrmEmployees::new(pool)),
        metrics,
        config,
    };
    http::serve(ServeConfig::new(cmd.host, LISTEN_PORT), state).await
}

async fn check_db(config: &AppConfig) -> Result<()> {
    let pool = setup_pool(config).await?;
    platform_db::ping(&pool)
        .await
        .with_context(|| format!("database {} unreachable", config.database.host))?;
    info!(host = %config.database.host, "database reachable");
    Ok(())
}
