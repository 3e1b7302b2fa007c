use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use drinks_api::app::{self, AppState};
use drinks_api::config;
use drinks_api::database::Database;

#[derive(Debug, Parser)]
#[command(name = "drinks-api", version, about = "Drinks menu API server")]
struct Cli {
    /// Drop every drink and reseed the sample drink before serving
    #[arg(long)]
    reset_db: bool,

    /// Listen on this port instead of the configured one
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting Drinks API in {:?} mode", config.environment);

    let db = Database::connect(&config.database)
        .await
        .context("failed to open drink store")?;
    if cli.reset_db {
        db.reset().await.context("failed to reset drink store")?;
    }

    let verifier = config.auth.verifier()?;
    let app = app::router(AppState::new(db.clone(), verifier), &config.security);

    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
