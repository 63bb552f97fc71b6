use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use bookstore_metrics::cli::{self, Cli, Command};
use bookstore_metrics::config::Config;
use bookstore_metrics::{server, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Subcommands that don't start the server ─────────────────
    if let Some(Command::Config { output }) = &cli.command {
        let template = cli::generate_config_template();
        match output {
            Some(path) => std::fs::write(path, template)?,
            None => print!("{template}"),
        }
        return Ok(());
    }

    // ── 1. Load configuration ────────────────────────────────────
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    // ── 2. Logging ───────────────────────────────────────────────
    telemetry::init(&config.observability.log_level);

    // ── 3. Build shared state ────────────────────────────────────
    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .map_err(|e| format!("invalid server.host '{}': {e}", config.server.host))?;
    let addr = SocketAddr::from((ip, config.server.port));
    let state = Arc::new(AppState::new(config));

    // ── 4. Build Axum router ─────────────────────────────────────
    let app = server::create_router(state);

    // ── 5. Bind & serve ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{addr}");
    tracing::info!("Dashboard       → http://{addr}/dashboard");
    tracing::info!("Metrics JSON    → http://{addr}/metrics");
    tracing::info!("Metrics SSE     → http://{addr}/metrics/stream");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
