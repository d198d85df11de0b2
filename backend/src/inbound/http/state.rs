//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::MessageDispatch;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub dispatch: Arc<dyn MessageDispatch>,
}

impl HttpState {
    /// Construct state from the dispatch use-case.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use smsgate::domain::{DispatchLimits, MessageDispatchService};
    /// use smsgate::inbound::http::state::HttpState;
    /// use smsgate::outbound::memory::{InMemoryMessageStore, InMemoryWindowCounterStore};
    /// use smsgate::outbound::sms::SimulatedSmsProvider;
    ///
    /// let service = MessageDispatchService::new(
    ///     Arc::new(InMemoryMessageStore::default()),
    ///     Arc::new(InMemoryWindowCounterStore::default()),
    ///     Arc::new(SimulatedSmsProvider::default()),
    ///     Arc::new(DefaultClock),
    ///     DispatchLimits::default(),
    /// );
    /// let _state = HttpState::new(Arc::new(service));
    /// ```
    pub fn new(dispatch: Arc<dyn MessageDispatch>) -> Self {
        Self { dispatch }
    }
}
