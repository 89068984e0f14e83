//! hw-dash - World happiness dashboard
//!
//! `snapshot` loads the dashboard once and prints both views as JSON.
//! `serve` keeps it running behind an HTTP/SSE API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hw_common::config::{ConfigOverrides, DashboardConfig, API_BASE_URL_ENV};
use hw_common::events::EventBus;
use serde_json::json;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hw_dash::{build_router, AppState, HttpKpiSource};

/// Command-line arguments for hw-dash
#[derive(Parser, Debug)]
#[command(name = "hw-dash")]
#[command(about = "World happiness KPI dashboard")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/happyworld/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// KPI API root
    #[arg(long, global = true, env = API_BASE_URL_ENV)]
    api_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every panel once and print the views as JSON
    Snapshot {
        /// Year to show instead of the most recent one
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Serve the dashboard over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// The coordinator is cooperative: one thread is enough
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        config_path: args.config.clone(),
        api_base_url: args.api_base_url.clone(),
        timeout_secs: args.timeout_secs,
        port: match args.command {
            Command::Serve { port } => port,
            Command::Snapshot { .. } => None,
        },
    };

    // Loaded before tracing so logging.level can seed the filter
    let config = DashboardConfig::load(&overrides);
    let log_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hw_dash={0},hw_common={0},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting happy world dashboard (hw-dash) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = config.context("Failed to load configuration")?;
    info!(api = %config.api.base_url, timeout_secs = config.api.timeout_secs, "KPI API");

    let source = HttpKpiSource::new(config.api.clone()).context("Failed to create KPI client")?;
    let state = AppState::new(Arc::new(source), config.api.timeout(), EventBus::default());

    match args.command {
        Command::Snapshot { year } => run_snapshot(state, year).await,
        Command::Serve { .. } => run_server(state, &config).await,
    }
}

async fn run_snapshot(state: AppState, year: Option<i32>) -> Result<()> {
    state.coordinator.initialize().await.settled().await;

    if let Some(year) = year {
        state
            .coordinator
            .set_year(year)
            .context("Invalid --year")?
            .settled()
            .await;
    }

    let output = json!({
        "year": state.coordinator.year(),
        "empty_state": state.coordinator.is_empty_state(),
        "summary": serde_json::to_value(&*state.summary.snapshot())?,
        "trend": serde_json::to_value(&*state.trend.snapshot())?,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_server(state: AppState, config: &DashboardConfig) -> Result<()> {
    // Initial fetches complete in the background while the server starts
    let pending = state.coordinator.initialize().await;
    info!(requested = pending.len(), "Initial year-scoped fetches issued");

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind_addr, config.server.port)
        .parse()
        .context("Invalid server bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("hw-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
