//! Fixed-window usage counters.
//!
//! Quotas and rate limits share one shape: a count that resets at an
//! absolute instant. Windows do not slide; the first use after `reset_at`
//! starts a new window anchored at that moment.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use super::ClientId;

/// Errors raised when building a [`WindowPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowPolicyError {
    /// Windows must have a positive length.
    #[error("window length must be positive")]
    NonPositiveWindow,
}

/// Limit and window length for one counter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    limit: u32,
    window: TimeDelta,
}

impl WindowPolicy {
    /// Build a policy allowing `limit` uses per `window`.
    pub fn new(limit: u32, window: TimeDelta) -> Result<Self, WindowPolicyError> {
        if window <= TimeDelta::zero() {
            return Err(WindowPolicyError::NonPositiveWindow);
        }
        Ok(Self { limit, window })
    }

    /// `limit` uses per hour.
    pub fn hourly(limit: u32) -> Self {
        Self {
            limit,
            window: TimeDelta::hours(1),
        }
    }

    /// `limit` uses per 24 hours.
    pub fn daily(limit: u32) -> Self {
        Self {
            limit,
            window: TimeDelta::hours(24),
        }
    }

    /// Uses allowed per window.
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length.
    pub const fn window(&self) -> TimeDelta {
        self.window
    }
}

/// Counter state for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUsage {
    /// Uses recorded in the current window.
    pub count: u32,
    /// Instant after which the window resets.
    pub reset_at: DateTime<Utc>,
}

impl WindowUsage {
    /// Empty window starting at `now`.
    pub fn fresh(now: DateTime<Utc>, policy: &WindowPolicy) -> Self {
        Self {
            count: 0,
            reset_at: now + policy.window(),
        }
    }

    /// Whether `now` is past the reset instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_at
    }

    /// This window, or a fresh one if it has expired.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, Utc};
    /// use smsgate::domain::{WindowPolicy, WindowUsage};
    ///
    /// let policy = WindowPolicy::hourly(10);
    /// let start = Utc::now();
    /// let used = WindowUsage { count: 10, reset_at: start + TimeDelta::hours(1) };
    ///
    /// assert_eq!(used.refreshed(start, &policy).count, 10);
    /// let later = start + TimeDelta::hours(1) + TimeDelta::seconds(1);
    /// assert_eq!(used.refreshed(later, &policy).count, 0);
    /// ```
    pub fn refreshed(self, now: DateTime<Utc>, policy: &WindowPolicy) -> Self {
        if self.is_expired(now) {
            Self::fresh(now, policy)
        } else {
            self
        }
    }

    /// Uses left before the limit is hit.
    pub fn remaining(&self, policy: &WindowPolicy) -> u32 {
        policy.limit().saturating_sub(self.count)
    }

    /// Whether another use would exceed the limit.
    pub fn is_exhausted(&self, policy: &WindowPolicy) -> bool {
        self.count >= policy.limit()
    }
}

/// Counter families tracked per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterScope {
    /// Every HTTP request.
    Requests,
    /// Send attempts, regardless of tier.
    Sends,
    /// Free-tier deliveries.
    FreeQuota,
}

impl CounterScope {
    /// Short name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requests => "requests",
            Self::Sends => "sends",
            Self::FreeQuota => "free_quota",
        }
    }
}

/// Key of a single window counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    /// Counter family.
    pub scope: CounterScope,
    /// Client the counter belongs to.
    pub client: ClientId,
}

impl CounterKey {
    /// Build a key for `client` in `scope`.
    pub fn new(scope: CounterScope, client: ClientId) -> Self {
        Self { scope, client }
    }
}
