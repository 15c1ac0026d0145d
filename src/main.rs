use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use kakeibo::ledger::MemoryLedger;
use kakeibo::middleware::{AppConfig, app_router};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kakeibo=info,tower_http=info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::from_env()?;
    let bind_address = config.bind_address().to_string();
    let ledger = MemoryLedger::new(config.tables().clone());

    let app = app_router(config, ledger).layer(TraceLayer::new_for_http());

    info!(address = %bind_address, "Starting kakeibo");
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
