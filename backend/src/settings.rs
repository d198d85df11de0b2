//! Server settings loaded via OrthoConfig.
//!
//! Values layer from CLI flags, `SMSGATE_*` environment variables and an
//! optional configuration file. Unset values fall back to the defaults
//! below. Twilio credentials are not part of this struct; they are read
//! separately so they never end up in a config file.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{DEFAULT_FREE_TIER_KEY, DispatchLimits, WindowPolicy, WindowPolicyError};
use crate::outbound::sms::{DEFAULT_SIMULATED_DELAY, DEFAULT_TWILIO_API_BASE};

/// Port bound when none is configured.
pub const DEFAULT_PORT: u16 = 3000;
/// Free-tier sends per client per day.
pub const DEFAULT_FREE_QUOTA: u32 = 1;
/// Send attempts per client per hour.
pub const DEFAULT_SEND_RATE_LIMIT: u32 = 10;
/// Requests per client per request window.
pub const DEFAULT_REQUEST_RATE_LIMIT: u32 = 100;
/// Request window length in minutes.
pub const DEFAULT_REQUEST_WINDOW_MINUTES: u32 = 15;
/// Upper bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
/// How often expired counter windows are pruned.
pub const DEFAULT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Invalid setting values.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A rate or quota window could not be built.
    #[error("invalid {setting}: {source}")]
    Window {
        setting: &'static str,
        #[source]
        source: WindowPolicyError,
    },
    /// The Twilio API base is not a valid URL.
    #[error("invalid twilio_api_base: {0}")]
    ApiBase(#[from] url::ParseError),
}

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SMSGATE")]
pub struct ServerSettings {
    /// Interface to bind; defaults to all interfaces.
    pub host: Option<IpAddr>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Free-tier sends allowed per client per day.
    pub free_quota: Option<u32>,
    /// Send attempts allowed per client per hour.
    pub send_rate_limit: Option<u32>,
    /// Requests allowed per client per request window.
    pub request_rate_limit: Option<u32>,
    /// Length of the request window in minutes.
    pub request_window_minutes: Option<u32>,
    /// Delay before a simulated message reports `sent`.
    pub simulated_delay_ms: Option<u64>,
    /// Key that selects the free tier.
    pub free_tier_key: Option<String>,
    /// Timeout for a single provider call, in seconds.
    pub provider_timeout_secs: Option<u64>,
    /// Use `Forwarded` / `X-Forwarded-For` for client identity.
    #[ortho_config(default = false)]
    pub trust_forwarded: bool,
    /// Root of the Twilio REST API.
    pub twilio_api_base: Option<String>,
    /// Seconds between sweeps of expired counter windows.
    pub prune_interval_secs: Option<u64>,
}

impl ServerSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Quota and send limits for the dispatch service.
    pub fn dispatch_limits(&self) -> DispatchLimits {
        DispatchLimits {
            free_quota: WindowPolicy::daily(self.free_quota.unwrap_or(DEFAULT_FREE_QUOTA)),
            send_rate: WindowPolicy::hourly(
                self.send_rate_limit.unwrap_or(DEFAULT_SEND_RATE_LIMIT),
            ),
            free_tier_key: self
                .free_tier_key
                .clone()
                .unwrap_or_else(|| DEFAULT_FREE_TIER_KEY.to_owned()),
        }
    }

    /// Policy applied by the request limiter.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Window`] when the window length is zero.
    pub fn request_policy(&self) -> Result<WindowPolicy, SettingsError> {
        let minutes = self
            .request_window_minutes
            .unwrap_or(DEFAULT_REQUEST_WINDOW_MINUTES);
        WindowPolicy::new(
            self.request_rate_limit.unwrap_or(DEFAULT_REQUEST_RATE_LIMIT),
            TimeDelta::minutes(i64::from(minutes)),
        )
        .map_err(|source| SettingsError::Window {
            setting: "request_window_minutes",
            source,
        })
    }

    /// Delay before simulated messages settle.
    pub fn simulated_delay(&self) -> Duration {
        self.simulated_delay_ms
            .map_or(DEFAULT_SIMULATED_DELAY, Duration::from_millis)
    }

    /// Timeout for provider calls.
    pub fn provider_timeout(&self) -> Duration {
        self.provider_timeout_secs
            .map_or(DEFAULT_PROVIDER_TIMEOUT, Duration::from_secs)
    }

    /// Interval between counter sweeps.
    pub fn prune_interval(&self) -> Duration {
        self.prune_interval_secs
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_PRUNE_INTERVAL, Duration::from_secs)
    }

    /// Parsed Twilio API root.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ApiBase`] when the configured value is not a URL.
    pub fn twilio_api_base(&self) -> Result<Url, SettingsError> {
        Ok(Url::parse(
            self.twilio_api_base
                .as_deref()
                .unwrap_or(DEFAULT_TWILIO_API_BASE),
        )?)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "SMSGATE_HOST",
        "SMSGATE_PORT",
        "SMSGATE_FREE_QUOTA",
        "SMSGATE_SIMULATED_DELAY_MS",
        "SMSGATE_TRUST_FORWARDED",
        "SMSGATE_TWILIO_API_BASE",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("smsgate")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().port(), DEFAULT_PORT);
        assert!(settings.bind_addr().ip().is_unspecified());
        assert_eq!(settings.dispatch_limits(), DispatchLimits::default());
        assert_eq!(settings.simulated_delay(), DEFAULT_SIMULATED_DELAY);
        assert_eq!(settings.provider_timeout(), DEFAULT_PROVIDER_TIMEOUT);
        assert!(!settings.trust_forwarded);
        assert_eq!(
            settings.twilio_api_base().expect("default base").as_str(),
            DEFAULT_TWILIO_API_BASE
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SMSGATE_HOST", Some("127.0.0.1".to_owned())),
            ("SMSGATE_PORT", Some("8081".to_owned())),
            ("SMSGATE_FREE_QUOTA", Some("3".to_owned())),
            ("SMSGATE_SIMULATED_DELAY_MS", Some("250".to_owned())),
            ("SMSGATE_TRUST_FORWARDED", Some("true".to_owned())),
            ("SMSGATE_TWILIO_API_BASE", Some("http://127.0.0.1:9000/".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:8081".parse().expect("addr"));
        assert_eq!(settings.dispatch_limits().free_quota.limit(), 3);
        assert_eq!(settings.simulated_delay(), Duration::from_millis(250));
        assert!(settings.trust_forwarded);
        assert_eq!(
            settings.twilio_api_base().expect("base").as_str(),
            "http://127.0.0.1:9000/"
        );
    }

    #[test]
    fn zero_length_request_windows_are_rejected() {
        let settings = ServerSettings {
            request_window_minutes: Some(0),
            ..ServerSettings::default()
        };
        let err = settings.request_policy().expect_err("zero window");
        assert!(matches!(err, SettingsError::Window { setting: "request_window_minutes", .. }));
    }

    #[test]
    fn malformed_api_bases_are_rejected() {
        let settings = ServerSettings {
            twilio_api_base: Some("not a url".to_owned()),
            ..ServerSettings::default()
        };
        assert!(matches!(settings.twilio_api_base(), Err(SettingsError::ApiBase(_))));
    }
}
