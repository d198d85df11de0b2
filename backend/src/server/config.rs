//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use smsgate::domain::ports::SmsProvider;
use smsgate::domain::{DispatchLimits, WindowPolicy};
use smsgate::inbound::http::client_identity::ClientIdentityConfig;
use smsgate::settings::{ServerSettings, SettingsError};

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) limits: DispatchLimits,
    pub(crate) request_policy: WindowPolicy,
    pub(crate) identity: ClientIdentityConfig,
    pub(crate) provider: Arc<dyn SmsProvider>,
    pub(crate) prune_interval: Duration,
}

impl ServerConfig {
    /// Resolve settings against the chosen provider.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a configured window is invalid.
    pub fn from_settings(
        settings: &ServerSettings,
        provider: Arc<dyn SmsProvider>,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr(),
            limits: settings.dispatch_limits(),
            request_policy: settings.request_policy()?,
            identity: ClientIdentityConfig {
                trust_forwarded: settings.trust_forwarded,
            },
            provider,
            prune_interval: settings.prune_interval(),
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
