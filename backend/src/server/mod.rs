//! Server construction and background tasks.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub(crate) use state_builders::provider_from_env;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{HttpServer, web};

use smsgate::app::{AppDependencies, build_app};
use smsgate::domain::ports::WindowCounterStore;
use smsgate::inbound::http::health::HealthState;
use smsgate::middleware::RequestRateLimit;
use state_builders::{build_shared_state, spawn_counter_janitor};

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Also starts the janitor that prunes expired counter windows.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let shared = build_shared_state(&config);
    let counters: Arc<dyn WindowCounterStore> = shared.counters;
    let request_limit = RequestRateLimit::new(
        Arc::clone(&counters),
        Arc::clone(&shared.clock),
        config.request_policy,
    );
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: shared.http_state,
        identity: config.identity,
        request_limit,
    };

    // `main` owns signal handling and marks the probes draining before stopping.
    let server = HttpServer::new(move || build_app(deps.clone()))
        .disable_signals()
        .bind(config.bind_addr)?
        .run();

    spawn_counter_janitor(counters, shared.clock, config.prune_interval);
    health_state.mark_ready();
    Ok(server)
}
