// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fieldtrace ingest worker
//!
//! Polls the raw device-event queue and reconciles card scans into the
//! attendance ledger, geofencing against field boundaries loaded at startup.

use fieldtrace::{
    config::Config,
    db::FirestoreDb,
    services::{AttendanceEngine, BoundaryService, DeviceLogIngestor},
};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        project = %config.gcp_project_id,
        poll_interval_secs = config.poll_interval_secs,
        "Starting Fieldtrace ingest worker"
    );

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Load field boundaries
    tracing::info!(path = %config.boundaries_path, "Loading field boundaries");
    let boundaries = BoundaryService::load_from_file(&config.boundaries_path)
        .expect("Failed to load field boundaries");
    tracing::info!(
        count = boundaries.fields().len(),
        "Field boundaries loaded"
    );

    let engine = AttendanceEngine::new(db.clone(), db.clone(), boundaries);
    let ingestor = DeviceLogIngestor::new(db, engine);

    let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    loop {
        interval.tick().await;
        match ingestor.drain().await {
            Ok(0) => {}
            Ok(processed) => tracing::info!(processed, "Drained device events"),
            Err(e) => tracing::error!(error = %e, "Device event drain failed"),
        }
    }
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
                .add_directive("fieldtrace=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
