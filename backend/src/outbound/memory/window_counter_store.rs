//! In-memory [`WindowCounterStore`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{AcquireOutcome, WindowCounterStore, WindowCounterStoreError};
use crate::domain::{CounterKey, WindowPolicy, WindowUsage};

type Windows = HashMap<CounterKey, WindowUsage>;

/// Fixed-window counters keyed by scope and client.
#[derive(Debug, Default)]
pub struct InMemoryWindowCounterStore {
    windows: Mutex<Windows>,
}

impl InMemoryWindowCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Windows>, WindowCounterStoreError> {
        self.windows
            .lock()
            .map_err(|_| WindowCounterStoreError::unavailable("counter store lock poisoned"))
    }
}

/// Fetch the live window for `key`, starting a new one if absent or expired.
fn live_window<'a>(
    windows: &'a mut Windows,
    key: &CounterKey,
    policy: &WindowPolicy,
    now: DateTime<Utc>,
) -> &'a mut WindowUsage {
    let usage = windows
        .entry(key.clone())
        .or_insert_with(|| WindowUsage::fresh(now, policy));
    *usage = usage.refreshed(now, policy);
    usage
}

#[async_trait]
impl WindowCounterStore for InMemoryWindowCounterStore {
    async fn current(
        &self,
        key: &CounterKey,
        policy: &WindowPolicy,
        now: DateTime<Utc>,
    ) -> Result<WindowUsage, WindowCounterStoreError> {
        let mut windows = self.lock()?;
        Ok(*live_window(&mut windows, key, policy, now))
    }

    async fn try_acquire(
        &self,
        key: &CounterKey,
        policy: &WindowPolicy,
        now: DateTime<Utc>,
    ) -> Result<AcquireOutcome, WindowCounterStoreError> {
        let mut windows = self.lock()?;
        let usage = live_window(&mut windows, key, policy, now);
        if usage.is_exhausted(policy) {
            return Ok(AcquireOutcome::Exhausted(*usage));
        }
        usage.count += 1;
        Ok(AcquireOutcome::Granted(*usage))
    }

    async fn release(
        &self,
        key: &CounterKey,
        reserved: WindowUsage,
        now: DateTime<Utc>,
    ) -> Result<(), WindowCounterStoreError> {
        let mut windows = self.lock()?;
        let live = windows
            .get_mut(key)
            .filter(|usage| usage.reset_at == reserved.reset_at && !usage.is_expired(now));
        if let Some(usage) = live {
            usage.count = usage.count.saturating_sub(1);
        }
        Ok(())
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, WindowCounterStoreError> {
        let mut windows = self.lock()?;
        let before = windows.len();
        windows.retain(|_, usage| !usage.is_expired(now));
        Ok((before - windows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, CounterScope};
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    fn key(scope: CounterScope) -> CounterKey {
        CounterKey::new(scope, ClientId::new("192.0.2.1").expect("client"))
    }

    #[fixture]
    fn store() -> InMemoryWindowCounterStore {
        InMemoryWindowCounterStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn current_creates_windows_lazily(store: InMemoryWindowCounterStore) {
        let policy = WindowPolicy::daily(1);
        let usage = store
            .current(&key(CounterScope::FreeQuota), &policy, start())
            .await
            .expect("current");
        assert_eq!(usage.count, 0);
        assert_eq!(usage.reset_at, start() + TimeDelta::hours(24));
    }

    #[rstest]
    #[tokio::test]
    async fn acquire_stops_at_the_limit(store: InMemoryWindowCounterStore) {
        let policy = WindowPolicy::hourly(2);
        let key = key(CounterScope::Sends);

        for expected in 1..=2 {
            let outcome = store.try_acquire(&key, &policy, start()).await.expect("acquire");
            assert_eq!(outcome, AcquireOutcome::Granted(WindowUsage {
                count: expected,
                reset_at: start() + TimeDelta::hours(1),
            }));
        }
        let outcome = store.try_acquire(&key, &policy, start()).await.expect("acquire");
        assert!(!outcome.is_granted());
        assert_eq!(outcome.usage().count, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn windows_reset_once_reset_at_passes(store: InMemoryWindowCounterStore) {
        let policy = WindowPolicy::daily(1);
        let key = key(CounterScope::FreeQuota);
        store.try_acquire(&key, &policy, start()).await.expect("acquire");

        let at_reset = start() + TimeDelta::hours(24);
        let outcome = store.try_acquire(&key, &policy, at_reset).await.expect("acquire");
        assert!(!outcome.is_granted(), "window still open at reset_at");

        let after = at_reset + TimeDelta::seconds(1);
        let outcome = store.try_acquire(&key, &policy, after).await.expect("acquire");
        assert!(outcome.is_granted());
        assert_eq!(outcome.usage().reset_at, after + TimeDelta::hours(24));
    }

    #[rstest]
    #[tokio::test]
    async fn scopes_are_counted_separately(store: InMemoryWindowCounterStore) {
        let policy = WindowPolicy::hourly(1);
        store
            .try_acquire(&key(CounterScope::Sends), &policy, start())
            .await
            .expect("acquire");
        let outcome = store
            .try_acquire(&key(CounterScope::Requests), &policy, start())
            .await
            .expect("acquire");
        assert!(outcome.is_granted());
    }

    #[rstest]
    #[tokio::test]
    async fn release_returns_a_unit(store: InMemoryWindowCounterStore) {
        let policy = WindowPolicy::daily(1);
        let key = key(CounterScope::FreeQuota);
        let reserved = store
            .try_acquire(&key, &policy, start())
            .await
            .expect("acquire")
            .usage();
        store.release(&key, reserved, start()).await.expect("release");
        store
            .release(&key, reserved, start())
            .await
            .expect("release below zero is a no-op");

        let usage = store.current(&key, &policy, start()).await.expect("current");
        assert_eq!(usage.count, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn late_release_leaves_the_next_window_alone(store: InMemoryWindowCounterStore) {
        let policy = WindowPolicy::daily(1);
        let key = key(CounterScope::FreeQuota);
        let first = store
            .try_acquire(&key, &policy, start())
            .await
            .expect("acquire")
            .usage();

        let next_window = start() + TimeDelta::hours(24) + TimeDelta::seconds(1);
        let second = store
            .try_acquire(&key, &policy, next_window)
            .await
            .expect("acquire");
        assert!(second.is_granted());

        store
            .release(&key, first, next_window + TimeDelta::seconds(1))
            .await
            .expect("release");

        let third = store
            .try_acquire(&key, &policy, next_window + TimeDelta::seconds(2))
            .await
            .expect("acquire");
        assert!(!third.is_granted(), "refund of an old window reopened the new one");
        assert_eq!(third.usage().count, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn prune_drops_only_expired_windows(store: InMemoryWindowCounterStore) {
        let short = WindowPolicy::hourly(5);
        let long = WindowPolicy::daily(5);
        store
            .current(&key(CounterScope::Sends), &short, start())
            .await
            .expect("current");
        store
            .current(&key(CounterScope::FreeQuota), &long, start())
            .await
            .expect("current");

        let removed = store
            .prune_expired(start() + TimeDelta::hours(2))
            .await
            .expect("prune");
        assert_eq!(removed, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acquires_never_exceed_the_limit() {
        let store = Arc::new(InMemoryWindowCounterStore::new());
        let policy = WindowPolicy::daily(1);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .try_acquire(&key(CounterScope::FreeQuota), &policy, start())
                        .await
                        .expect("acquire")
                        .is_granted()
                })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.expect("task joins") {
                granted += 1;
            }
        }
        assert_eq!(granted, 1);
    }
}
