//! Driving port for sending messages and reading back their state.
//!
//! Inbound adapters hand raw, unvalidated input to [`MessageDispatch`];
//! validation, quota accounting and provider hand-off all happen behind the
//! port so every adapter enforces the same rules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::{ClientId, Error, MessageId, MessageStatus};

/// Raw send request as received from a caller.
///
/// Fields hold the undecoded JSON values so missing or mistyped input is
/// reported as a validation failure rather than a decoding error. Numbers
/// are accepted where text is expected; `null` counts as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTextRequest {
    /// Destination number in any accepted notation.
    pub phone: Option<Value>,
    /// Message body.
    pub message: Option<Value>,
    /// Optional API key selecting the usage tier; must be a string.
    pub key: Option<Value>,
    /// Caller the quota and rate limits are charged to.
    pub client: ClientId,
}

impl SubmitTextRequest {
    /// Request from plain text fields, as decoded from a form.
    pub fn from_text(
        phone: Option<String>,
        message: Option<String>,
        key: Option<String>,
        client: ClientId,
    ) -> Self {
        Self {
            phone: phone.map(Value::String),
            message: message.map(Value::String),
            key: key.map(Value::String),
            client,
        }
    }
}

/// Free-tier allowance left after a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaRemaining {
    /// Sends left in the current quota window.
    Limited(u32),
    /// Keyed callers have no daily quota.
    Unlimited,
}

/// Outcome of an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTextResponse {
    /// Identifier for status lookups.
    pub text_id: MessageId,
    /// Allowance left for the caller.
    pub quota_remaining: QuotaRemaining,
    /// Whether delivery was simulated.
    pub simulated: bool,
}

/// Snapshot of a stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStatusResponse {
    /// Identifier that was looked up.
    pub text_id: MessageId,
    /// Current delivery status.
    pub status: MessageStatus,
    /// When the request was accepted.
    pub timestamp: DateTime<Utc>,
}

/// Free-tier allowance for a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    /// Sends left in the current window.
    pub remaining: u32,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

/// Message dispatch use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageDispatch: Send + Sync {
    /// Validate, charge and hand a message to the provider.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` with per-field `details` when input is rejected.
    /// - `RateLimited` when the caller exceeded the hourly send limit.
    /// - `QuotaExceeded` when a free-tier caller has no sends left.
    /// - `ProviderFailure` carrying the `text_id` when the carrier refused.
    async fn submit(&self, request: SubmitTextRequest) -> Result<SubmitTextResponse, Error>;

    /// Look up the status of a previously submitted message.
    ///
    /// Returns `NotFound` for unknown identifiers.
    async fn status(&self, text_id: &str) -> Result<TextStatusResponse, Error>;

    /// Read the caller's free-tier allowance without consuming it.
    async fn quota(&self, client: &ClientId) -> Result<QuotaSnapshot, Error>;
}
