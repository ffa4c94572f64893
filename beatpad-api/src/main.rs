//! beatpad-api - HTTP backend for the drum-beat composition tool
//!
//! Settings come from the command line, the environment, an optional TOML
//! file and compiled defaults, in that order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use beatpad_common::config::{load_toml_config, resolve_config, CliOverrides};
use beatpad_common::db::init_database;
use beatpad_api::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for beatpad-api
#[derive(Parser, Debug)]
#[command(name = "beatpad-api")]
#[command(about = "Beat, text and page backend for Beatpad")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "BEATPAD_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BEATPAD_HOST")]
    host: Option<String>,

    /// SQLite database file (falls back to BEATPAD_DATABASE)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "BEATPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = resolve_config(
        CliOverrides {
            database_path: args.database,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
        },
        toml,
    );

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("beatpad_api={0},beatpad_common={0},tower_http={0}", config.log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Beatpad API v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let app = build_router(AppState::new(pool.clone()));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!("beatpad-api listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
    }
}
