use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use smart_parking_api::{
    app::{self, AppState},
    config::{Config, StoreBackend},
    constants::API_NAME,
    repository::{InMemoryParkedCarStore, ParkedCarStore, PgParkedCarStore},
    service::{DetectionRelay, HttpPlateDetector, ParkingService},
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("{} Starting Smart Parking API on port {}", API_NAME, config.server_port);

    let store = build_store(&config).await?;
    store
        .init_schema()
        .await
        .context("Failed to initialize parked_cars schema")?;
    tracing::info!("{} Database initialized", API_NAME);

    let detector = HttpPlateDetector::new(
        &config.detection_service_url,
        Duration::from_secs(config.detection_timeout_secs),
    )
    .context("Failed to build detection service client")?;
    tracing::info!("{} Relaying detections to {}", API_NAME, detector.endpoint());

    let state = AppState::new(
        ParkingService::new(store),
        DetectionRelay::new(Arc::new(detector)),
    );
    let app = app::router(state, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("{} Server listening on {}", API_NAME, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("{} Server stopped", API_NAME);
    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ParkedCarStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("{} Connected to database", API_NAME);
            Ok(Arc::new(PgParkedCarStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("{} Using in-memory store; data is lost on restart", API_NAME);
            Ok(Arc::new(InMemoryParkedCarStore::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("{} Failed to listen for Ctrl-C: {}", API_NAME, e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("{} Failed to listen for SIGTERM: {}", API_NAME, e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("{} Shutdown signal received", API_NAME);
}
