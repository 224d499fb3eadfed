//! # pm-console
//!
//! Assembles the maintenance console: settings, logging, the HTTP backend
//! client, the service layer and the axum router.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState};
use backend_adapters::HttpBackend;
use configs::{LogFormat, LoggingSettings, Settings};
use services::{MaintenanceService, ServiceSettings};
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.logging);
    if let Some(path) = &settings.env_file {
        debug!(path = %path.display(), "loaded .env");
    }

    let backend = HttpBackend::new(&settings.backend.base_url, settings.backend.timeout())
        .context("building backend client")?;
    info!(backend = %backend.base_url(), "using analysis backend");

    let service = MaintenanceService::new(
        Arc::new(backend),
        ServiceSettings {
            preview_size: settings.dashboard.preview_size,
            cache_ttl: settings.dashboard.cache_ttl(),
        },
    );
    let app = router(AppState::new(service));

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!(%address, "maintenance console listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    info!("maintenance console stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
