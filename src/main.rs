use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use infra_market_api::config::AppConfig;
use infra_market_api::database::Database;
use infra_market_api::{app, AppState, Stores};

#[derive(Parser)]
#[command(name = "infra-market-api")]
#[command(about = "Infra Market admin API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides SERVER_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides INFRA_MARKET_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Do not run pending database migrations on startup")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,infra_market_api=debug")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting Infra Market API in {:?} mode", config.environment);

    let (stores, database) = if config.database.url.is_some() {
        let database = Database::connect(&config.database)
            .await
            .context("database connection failed")?;
        if !args.skip_migrations {
            database.migrate().await.context("database migration failed")?;
        }
        (Stores::postgres(&database), Some(database))
    } else {
        tracing::warn!("DATABASE_URL not set, using in-memory stores; data is lost on exit");
        (Stores::memory(), None)
    };

    let config = Arc::new(config);
    let state = AppState::new(config.clone(), stores, database.clone())
        .context("failed to build HTTP client")?;

    state
        .auth
        .bootstrap_admin()
        .await
        .context("failed to create bootstrap admin")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Infra Market API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    if let Some(database) = database {
        database.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
