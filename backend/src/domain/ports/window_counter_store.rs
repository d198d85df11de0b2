//! Port for fixed-window usage counters.
//!
//! One store backs the request limiter, the send rate limit and the
//! free-tier quota. Counters are created lazily and reset lazily: whenever a
//! key is touched after its `reset_at`, the adapter starts a fresh window
//! anchored at `now` before doing anything else.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CounterKey, WindowPolicy, WindowUsage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by counter store adapters.
    pub enum WindowCounterStoreError {
        /// The backing store could not be used.
        Unavailable { message: String } => "counter store unavailable: {message}",
    }
}

/// Result of trying to consume one unit of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The unit was recorded; usage after the increment.
    Granted(WindowUsage),
    /// The window was already full; usage left untouched.
    Exhausted(WindowUsage),
}

impl AcquireOutcome {
    /// Usage after the attempt.
    pub const fn usage(&self) -> WindowUsage {
        match self {
            Self::Granted(usage) | Self::Exhausted(usage) => *usage,
        }
    }

    /// Whether the unit was recorded.
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Counter storage shared by every quota and rate limit.
///
/// `try_acquire` is a single check-and-increment: two concurrent callers
/// cannot both take the last unit of a window.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WindowCounterStore: Send + Sync {
    /// Usage for `key`, creating or resetting the window as needed.
    async fn current(
        &self,
        key: &CounterKey,
        policy: &WindowPolicy,
        now: DateTime<Utc>,
    ) -> Result<WindowUsage, WindowCounterStoreError>;

    /// Consume one unit if the window has room.
    async fn try_acquire(
        &self,
        key: &CounterKey,
        policy: &WindowPolicy,
        now: DateTime<Utc>,
    ) -> Result<AcquireOutcome, WindowCounterStoreError>;

    /// Give back a unit taken by [`Self::try_acquire`].
    ///
    /// `reserved` is the usage returned with the grant. The unit is returned
    /// only to that window: a no-op when it has since expired or been
    /// replaced, or when the count is zero.
    async fn release(
        &self,
        key: &CounterKey,
        reserved: WindowUsage,
        now: DateTime<Utc>,
    ) -> Result<(), WindowCounterStoreError>;

    /// Drop counters whose window ended before `now`.
    ///
    /// Returns the number of counters removed.
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, WindowCounterStoreError>;
}
