//! SMS provider adapters.
//!
//! `TwilioSmsProvider` talks to the Twilio REST API; `SimulatedSmsProvider`
//! stands in when credentials are absent. [`provider_selection_from_env`]
//! decides which one the server wires up.

mod credentials;
mod dto;
mod simulated;
mod twilio;

pub use credentials::{
    AuthToken, ProviderSelection, TWILIO_ACCOUNT_SID_ENV, TWILIO_AUTH_TOKEN_ENV,
    TWILIO_FROM_NUMBER_ENV, TwilioCredentials, provider_selection_from_env,
};
pub use simulated::{DEFAULT_SIMULATED_DELAY, SimulatedSmsProvider};
pub use twilio::{DEFAULT_TWILIO_API_BASE, TwilioSetupError, TwilioSmsProvider};
