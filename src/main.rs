// SPDX-License-Identifier: MIT
// Copyright 2026 Stanford 360 Contributors

//! Stanford 360 API Server
//!
//! Logs activity minutes, water and protein for each user and reports
//! progress against the daily goals.

use stanford360_tracker::{
    config::Config, db::FirestoreDb, services::TrackerRegistry, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        time_zone = %config.time_zone,
        "Starting Stanford 360 API"
    );

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let trackers = TrackerRegistry::new(db.clone(), config.time_zone);

    // Drop sessions nobody has used for a while
    let idle_timeout = config.session_idle_timeout;
    let sweep = trackers.spawn_idle_sweep(idle_timeout / 2, idle_timeout);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        trackers: trackers.clone(),
    });

    // Build router
    let app = stanford360_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight Firestore writes land before the process exits
    sweep.abort();
    tracing::info!(sessions = trackers.len(), "Flushing pending writes");
    trackers.flush_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stanford360_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
