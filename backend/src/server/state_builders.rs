//! Builders for the provider, stores and HTTP state.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use mockable::{Clock, DefaultClock, DefaultEnv};
use tracing::{debug, info, warn};

use smsgate::domain::MessageDispatchService;
use smsgate::domain::ports::{SmsProvider, WindowCounterStore};
use smsgate::inbound::http::state::HttpState;
use smsgate::outbound::memory::{InMemoryMessageStore, InMemoryWindowCounterStore};
use smsgate::outbound::sms::{
    ProviderSelection, SimulatedSmsProvider, TwilioSetupError, TwilioSmsProvider,
    provider_selection_from_env,
};
use smsgate::settings::{ServerSettings, SettingsError};

use super::ServerConfig;

/// Startup failures while wiring the provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderSetupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Twilio(#[from] TwilioSetupError),
}

/// Choose the SMS provider for `selection`.
///
/// Partial credentials fall back to simulation with a warning.
pub(crate) fn build_provider(
    settings: &ServerSettings,
    selection: ProviderSelection,
) -> Result<Arc<dyn SmsProvider>, ProviderSetupError> {
    match selection {
        ProviderSelection::Twilio(credentials) => {
            let api_base = settings.twilio_api_base()?;
            let provider =
                TwilioSmsProvider::new(credentials, &api_base, settings.provider_timeout())?;
            info!(api_base = %api_base, "sending through Twilio");
            Ok(Arc::new(provider))
        }
        ProviderSelection::Simulated => {
            info!("Twilio credentials not set; simulating delivery");
            Ok(Arc::new(SimulatedSmsProvider::new(settings.simulated_delay())))
        }
        ProviderSelection::Incomplete { missing } => {
            warn!(
                missing = ?missing,
                "Twilio credentials incomplete; simulating delivery"
            );
            Ok(Arc::new(SimulatedSmsProvider::new(settings.simulated_delay())))
        }
    }
}

/// Choose the SMS provider from the Twilio variables in the process environment.
pub(crate) fn provider_from_env(
    settings: &ServerSettings,
) -> Result<Arc<dyn SmsProvider>, ProviderSetupError> {
    build_provider(settings, provider_selection_from_env(&DefaultEnv::new()))
}

/// State shared by every worker.
pub(crate) struct SharedState {
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) counters: Arc<InMemoryWindowCounterStore>,
    pub(crate) clock: Arc<dyn Clock>,
}

/// Build the stores and the dispatch service.
pub(crate) fn build_shared_state(config: &ServerConfig) -> SharedState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let counters = Arc::new(InMemoryWindowCounterStore::new());
    let service = MessageDispatchService::new(
        Arc::new(InMemoryMessageStore::new()),
        Arc::clone(&counters),
        Arc::clone(&config.provider),
        Arc::clone(&clock),
        config.limits.clone(),
    );
    info!(
        mode = config.provider.mode().as_str(),
        free_quota = service.limits().free_quota.limit(),
        send_rate = service.limits().send_rate.limit(),
        "dispatch service ready"
    );
    SharedState {
        http_state: web::Data::new(HttpState::new(Arc::new(service))),
        counters,
        clock,
    }
}

/// Periodically drop expired counter windows.
pub(crate) fn spawn_counter_janitor(
    counters: Arc<dyn WindowCounterStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match counters.prune_expired(clock.utc()).await {
                Ok(0) => {}
                Ok(pruned) => debug!(pruned, "pruned expired counter windows"),
                Err(error) => warn!(%error, "failed to prune counter windows"),
            }
        }
    })
}
