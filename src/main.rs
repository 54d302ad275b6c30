use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use hpr_core::{CoreConfig, PatientService, SnapshotFile, config::data_file_from_env_value};

/// Main entry point for the HPR server
///
/// Loads the patient snapshot (if configured) and serves the REST API until interrupted.
///
/// # Environment Variables
/// - `HPR_REST_ADDR`: REST server address (default: "127.0.0.1:5000")
/// - `PATIENT_DATA_FILE`: YAML snapshot to load and keep up to date (default: none, in-memory only)
/// - `RUST_LOG`: log filter (default adds `hpr_run=info`)
///
/// # Errors
/// Returns an error if:
/// - the logging configuration cannot be initialised,
/// - the data file configuration is invalid or the snapshot cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hpr_run=info".parse()?)
                .add_directive("hpr_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HPR_REST_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into());
    let data_file = data_file_from_env_value(std::env::var("PATIENT_DATA_FILE").ok());

    let cfg = Arc::new(CoreConfig::new(data_file)?);
    let patient_service = PatientService::new(cfg)?;

    match patient_service.snapshot().map(SnapshotFile::path) {
        Some(path) => tracing::info!(
            "++ Serving {} patient(s) from {}",
            patient_service.patient_count()?,
            path.display()
        ),
        None => tracing::info!("++ No PATIENT_DATA_FILE set, records are kept in memory only"),
    }

    let app = router(AppState::new(patient_service));

    tracing::info!("++ Starting HPR REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- HPR REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
