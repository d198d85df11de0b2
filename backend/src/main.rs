//! Service entry-point: loads configuration, selects the SMS provider and
//! runs the HTTP server.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server, provider_from_env};
use smsgate::inbound::http::health::HealthState;
use smsgate::settings::ServerSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv = dotenvy::dotenv();

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    if let Err(error) = dotenv {
        if !error.not_found() {
            warn!(%error, "failed to read .env file");
        }
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let provider = provider_from_env(&settings)
        .map_err(|e| std::io::Error::other(format!("failed to configure SMS provider: {e}")))?;
    let mode = provider.mode();
    let config = ServerConfig::from_settings(&settings, Arc::clone(&provider))
        .map_err(|e| std::io::Error::other(format!("invalid settings: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = config.bind_addr();
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, mode = mode.as_str(), "smsgate listening");

    let handle = server.handle();
    let shutdown_health = health_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_health.mark_draining();
            info!("shutdown requested; draining");
            handle.stop(true).await;
        }
    });

    server.await
}
