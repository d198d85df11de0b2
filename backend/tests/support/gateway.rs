//! Assembles the full application over in-memory adapters for HTTP tests.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use chrono::TimeDelta;
use mockable::Clock;
use smsgate::app::AppDependencies;
use smsgate::domain::ports::{SmsProvider, WindowCounterStore};
use smsgate::domain::{DispatchLimits, MessageDispatchService, WindowPolicy};
use smsgate::inbound::http::client_identity::ClientIdentityConfig;
use smsgate::inbound::http::health::HealthState;
use smsgate::inbound::http::state::HttpState;
use smsgate::middleware::RequestRateLimit;
use smsgate::outbound::memory::{InMemoryMessageStore, InMemoryWindowCounterStore};
use smsgate::outbound::sms::SimulatedSmsProvider;
use smsgate::test_support::{MutableClock, fixed_now};

/// Settlement delay short enough for tests to wait out in real time.
pub const SETTLE_AFTER: Duration = Duration::from_millis(20);

/// Knobs for one application instance.
pub struct GatewayOptions {
    pub limits: DispatchLimits,
    pub request_policy: WindowPolicy,
    pub provider: Arc<dyn SmsProvider>,
    pub identity: ClientIdentityConfig,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            limits: DispatchLimits::default(),
            request_policy: WindowPolicy::new(100, TimeDelta::minutes(15))
                .unwrap_or_else(|error| panic!("request policy: {error}")),
            provider: Arc::new(SimulatedSmsProvider::new(SETTLE_AFTER)),
            identity: ClientIdentityConfig::default(),
        }
    }
}

/// Application dependencies plus the handles tests steer it with.
pub struct Gateway {
    pub clock: Arc<MutableClock>,
    pub health: web::Data<HealthState>,
    pub deps: AppDependencies,
}

impl Gateway {
    pub fn new(options: GatewayOptions) -> Self {
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let counters = Arc::new(InMemoryWindowCounterStore::new());
        let service = MessageDispatchService::new(
            Arc::new(InMemoryMessageStore::new()),
            Arc::clone(&counters),
            options.provider,
            Arc::clone(&shared_clock),
            options.limits,
        );
        let request_counters: Arc<dyn WindowCounterStore> = counters;
        let health = web::Data::new(HealthState::new());
        health.mark_ready();
        let deps = AppDependencies {
            health_state: health.clone(),
            http_state: web::Data::new(HttpState::new(Arc::new(service))),
            identity: options.identity,
            request_limit: RequestRateLimit::new(
                request_counters,
                shared_clock,
                options.request_policy,
            ),
        };
        Self {
            clock,
            health,
            deps,
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(GatewayOptions::default())
    }
}
