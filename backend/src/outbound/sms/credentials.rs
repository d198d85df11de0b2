//! Twilio credential discovery.
//!
//! Credentials come from the process environment through [`mockable::Env`]
//! so selection logic can be exercised without touching real variables.

use mockable::Env;
use zeroize::Zeroize;

/// Account SID variable.
pub const TWILIO_ACCOUNT_SID_ENV: &str = "TWILIO_ACCOUNT_SID";
/// Auth token variable.
pub const TWILIO_AUTH_TOKEN_ENV: &str = "TWILIO_AUTH_TOKEN";
/// Sender number variable.
pub const TWILIO_FROM_NUMBER_ENV: &str = "TWILIO_FROM_NUMBER";

/// Twilio auth token, wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the secret for request signing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl Drop for AuthToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Complete Twilio account settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    /// Account identifier (`AC...`).
    pub account_sid: String,
    /// Secret used for basic auth.
    pub auth_token: AuthToken,
    /// Sender number in E.164 form.
    pub from_number: String,
}

/// Which provider the environment supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelection {
    /// All three variables are set.
    Twilio(TwilioCredentials),
    /// None are set.
    Simulated,
    /// Some are set; the listed ones are missing or blank.
    Incomplete {
        /// Names of the missing variables.
        missing: Vec<&'static str>,
    },
}

fn non_blank<E: Env>(env: &E, name: &'static str) -> Result<String, &'static str> {
    env.string(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(name)
}

/// Decide between live and simulated delivery.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use smsgate::outbound::sms::{provider_selection_from_env, ProviderSelection};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "TWILIO_ACCOUNT_SID" => Some("AC123".to_owned()),
///     _ => None,
/// });
///
/// let selection = provider_selection_from_env(&env);
/// assert_eq!(
///     selection,
///     ProviderSelection::Incomplete {
///         missing: vec!["TWILIO_AUTH_TOKEN", "TWILIO_FROM_NUMBER"],
///     }
/// );
/// ```
pub fn provider_selection_from_env<E: Env>(env: &E) -> ProviderSelection {
    let account_sid = non_blank(env, TWILIO_ACCOUNT_SID_ENV);
    let auth_token = non_blank(env, TWILIO_AUTH_TOKEN_ENV);
    let from_number = non_blank(env, TWILIO_FROM_NUMBER_ENV);

    match (account_sid, auth_token, from_number) {
        (Ok(account_sid), Ok(auth_token), Ok(from_number)) => {
            ProviderSelection::Twilio(TwilioCredentials {
                account_sid,
                auth_token: AuthToken::new(auth_token),
                from_number,
            })
        }
        (sid, token, from) => {
            let missing: Vec<&'static str> =
                [sid.err(), token.err(), from.err()].into_iter().flatten().collect();
            if missing.len() == 3 {
                ProviderSelection::Simulated
            } else {
                ProviderSelection::Incomplete { missing }
            }
        }
    }
}
