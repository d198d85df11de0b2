//! Message dispatch orchestration.
//!
//! [`MessageDispatchService`] implements the [`MessageDispatch`] driving port:
//! it validates input, charges the hourly send limit, reserves free-tier
//! quota, records the message and hands it to the configured provider.
//!
//! Quota is reserved with an atomic try-acquire before the provider call and
//! handed back if anything after the reservation fails, so a failed send
//! never consumes the caller's allowance.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AcquireOutcome, MessageDispatch, MessageStore, MessageStoreError, OutboundSms,
    ProviderReceipt, QuotaRemaining, QuotaSnapshot, SmsProvider, SubmitTextRequest,
    SubmitTextResponse, TextStatusResponse, WindowCounterStore, WindowCounterStoreError,
};
use crate::domain::{
    ClientId, CounterKey, CounterScope, DEFAULT_FREE_TIER_KEY, DeliveryOutcome, Error, MessageId,
    MessageRecord, TraceId, WindowPolicy, WindowUsage,
};

mod validation;

use validation::{ValidSubmission, validate};

/// Error text for callers over the hourly send limit.
pub const SEND_RATE_LIMITED: &str = "SMS rate limit exceeded. Please try again later.";
/// Error text for free-tier callers without quota left.
pub const FREE_QUOTA_EXCEEDED: &str = "Free quota exceeded";
/// Error text for unknown message identifiers.
pub const MESSAGE_NOT_FOUND: &str = "Message not found";

const MAX_ID_ATTEMPTS: usize = 5;

/// Quota and rate-limit settings applied by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchLimits {
    /// Free-tier allowance per client.
    pub free_quota: WindowPolicy,
    /// Send attempts allowed per client regardless of tier.
    pub send_rate: WindowPolicy,
    /// API key that explicitly selects the free tier.
    pub free_tier_key: String,
}

impl Default for DispatchLimits {
    fn default() -> Self {
        Self {
            free_quota: WindowPolicy::daily(1),
            send_rate: WindowPolicy::hourly(10),
            free_tier_key: DEFAULT_FREE_TIER_KEY.to_owned(),
        }
    }
}

/// Concrete implementation of [`MessageDispatch`].
pub struct MessageDispatchService<M, W, P: ?Sized> {
    messages: Arc<M>,
    counters: Arc<W>,
    provider: Arc<P>,
    clock: Arc<dyn Clock>,
    limits: DispatchLimits,
}

impl<M, W, P: ?Sized> MessageDispatchService<M, W, P> {
    /// Create a service over the given stores and provider.
    pub fn new(
        messages: Arc<M>,
        counters: Arc<W>,
        provider: Arc<P>,
        clock: Arc<dyn Clock>,
        limits: DispatchLimits,
    ) -> Self {
        Self {
            messages,
            counters,
            provider,
            clock,
            limits,
        }
    }

    /// Limits in force.
    pub fn limits(&self) -> &DispatchLimits {
        &self.limits
    }
}

fn map_counter_error(error: WindowCounterStoreError) -> Error {
    match error {
        WindowCounterStoreError::Unavailable { message } => {
            Error::internal(format!("counter store unavailable: {message}"))
        }
    }
}

fn map_message_error(error: MessageStoreError) -> Error {
    match error {
        MessageStoreError::UnknownId { .. } => Error::not_found(MESSAGE_NOT_FOUND),
        MessageStoreError::DuplicateId { id } => {
            Error::internal(format!("could not allocate a unique message id (last tried {id})"))
        }
        MessageStoreError::Transition { message } => {
            Error::internal(format!("message status transition rejected: {message}"))
        }
        MessageStoreError::Unavailable { message } => {
            Error::internal(format!("message store unavailable: {message}"))
        }
    }
}

fn fresh_id() -> MessageId {
    MessageId::generate(&mut rand::thread_rng())
}

impl<M, W, P> MessageDispatchService<M, W, P>
where
    M: MessageStore + 'static,
    W: WindowCounterStore,
    P: SmsProvider + ?Sized,
{
    async fn charge_send_rate(&self, client: &ClientId, now: DateTime<Utc>) -> Result<(), Error> {
        let key = CounterKey::new(CounterScope::Sends, client.clone());
        let outcome = self
            .counters
            .try_acquire(&key, &self.limits.send_rate, now)
            .await
            .map_err(map_counter_error)?;
        match outcome {
            AcquireOutcome::Granted(_) => Ok(()),
            AcquireOutcome::Exhausted(usage) => {
                info!(
                    client = %client.log_label(),
                    reset_at = %usage.reset_at,
                    "send rate limit reached"
                );
                Err(Error::rate_limited(SEND_RATE_LIMITED))
            }
        }
    }

    async fn reserve_quota(&self, key: &CounterKey, now: DateTime<Utc>) -> Result<WindowUsage, Error> {
        let outcome = self
            .counters
            .try_acquire(key, &self.limits.free_quota, now)
            .await
            .map_err(map_counter_error)?;
        match outcome {
            AcquireOutcome::Granted(usage) => Ok(usage),
            AcquireOutcome::Exhausted(usage) => {
                info!(
                    client = %key.client.log_label(),
                    reset_at = %usage.reset_at,
                    "free quota exhausted"
                );
                Err(Error::quota_exceeded(FREE_QUOTA_EXCEEDED))
            }
        }
    }

    async fn release_quota(&self, key: &CounterKey, reserved: WindowUsage) {
        if let Err(error) = self.counters.release(key, reserved, self.clock.utc()).await {
            warn!(%error, client = %key.client.log_label(), "failed to release quota reservation");
        }
    }

    async fn record_pending(
        &self,
        submission: &ValidSubmission,
        client: &ClientId,
        now: DateTime<Utc>,
    ) -> Result<MessageId, Error> {
        let mut last_error = None;
        for _ in 0..MAX_ID_ATTEMPTS {
            let record = MessageRecord::pending(
                fresh_id(),
                submission.phone.clone(),
                &submission.body,
                client.clone(),
                now,
            );
            let id = record.id.clone();
            match self.messages.insert(record).await {
                Ok(()) => return Ok(id),
                Err(error @ MessageStoreError::DuplicateId { .. }) => {
                    debug!(text_id = %id, "message id collision; drawing another");
                    last_error = Some(error);
                }
                Err(error) => return Err(map_message_error(error)),
            }
        }
        Err(last_error.map_or_else(
            || Error::internal("could not allocate a unique message id"),
            map_message_error,
        ))
    }

    async fn settle(&self, id: &MessageId, outcome: DeliveryOutcome) {
        if let Err(error) = self.messages.settle(id, outcome).await {
            warn!(%error, text_id = %id, "failed to settle message record");
        }
    }

    fn schedule_settlement(&self, id: MessageId, delay: Duration) {
        let messages = Arc::clone(&self.messages);
        tokio::spawn(TraceId::in_current_scope(async move {
            tokio::time::sleep(delay).await;
            match messages
                .settle(&id, DeliveryOutcome::Sent { provider_ref: None })
                .await
            {
                Ok(_) => debug!(text_id = %id, "simulated delivery settled"),
                Err(error) => warn!(%error, text_id = %id, "failed to settle simulated delivery"),
            }
        }));
    }

    /// Record the message and hand it to the provider.
    ///
    /// Returns the new id and whether delivery was simulated.
    async fn deliver(
        &self,
        submission: ValidSubmission,
        client: &ClientId,
        now: DateTime<Utc>,
    ) -> Result<(MessageId, bool), Error> {
        let text_id = self.record_pending(&submission, client, now).await?;
        let masked = submission.phone.masked();
        let sms = OutboundSms {
            to: submission.phone,
            body: submission.body,
        };

        match self.provider.send(&sms).await {
            Ok(ProviderReceipt::Delivered { reference }) => {
                info!(text_id = %text_id, to = %masked, provider_ref = %reference, "message sent");
                self.settle(
                    &text_id,
                    DeliveryOutcome::Sent {
                        provider_ref: Some(reference),
                    },
                )
                .await;
                Ok((text_id, false))
            }
            Ok(ProviderReceipt::Simulated { settle_after }) => {
                info!(
                    text_id = %text_id,
                    to = %masked,
                    settle_after_ms = settle_after.as_millis(),
                    "message delivery simulated"
                );
                self.schedule_settlement(text_id.clone(), settle_after);
                Ok((text_id, true))
            }
            Err(error) => {
                let reason = error.to_string();
                warn!(text_id = %text_id, to = %masked, %reason, "provider rejected message");
                self.settle(
                    &text_id,
                    DeliveryOutcome::Failed {
                        reason: reason.clone(),
                    },
                )
                .await;
                Err(Error::provider_failure(text_id.as_str(), reason))
            }
        }
    }
}

#[async_trait]
impl<M, W, P> MessageDispatch for MessageDispatchService<M, W, P>
where
    M: MessageStore + 'static,
    W: WindowCounterStore,
    P: SmsProvider + ?Sized,
{
    async fn submit(&self, request: SubmitTextRequest) -> Result<SubmitTextResponse, Error> {
        let submission = validate(&request, &self.limits.free_tier_key)?;
        let client = request.client;
        let now = self.clock.utc();

        self.charge_send_rate(&client, now).await?;

        let quota_key = submission
            .tier
            .is_free()
            .then(|| CounterKey::new(CounterScope::FreeQuota, client.clone()));
        let reserved = match &quota_key {
            Some(key) => Some(self.reserve_quota(key, now).await?),
            None => None,
        };

        let (text_id, simulated) = match self.deliver(submission, &client, now).await {
            Ok(delivered) => delivered,
            Err(error) => {
                if let (Some(key), Some(usage)) = (&quota_key, reserved) {
                    self.release_quota(key, usage).await;
                }
                return Err(error);
            }
        };

        let quota_remaining = reserved.map_or(QuotaRemaining::Unlimited, |usage| {
            QuotaRemaining::Limited(usage.remaining(&self.limits.free_quota))
        });
        Ok(SubmitTextResponse {
            text_id,
            quota_remaining,
            simulated,
        })
    }

    async fn status(&self, text_id: &str) -> Result<TextStatusResponse, Error> {
        let id = MessageId::new(text_id).map_err(|_| Error::not_found(MESSAGE_NOT_FOUND))?;
        let record = self
            .messages
            .find(&id)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| Error::not_found(MESSAGE_NOT_FOUND))?;
        Ok(TextStatusResponse {
            text_id: record.id,
            status: record.status,
            timestamp: record.created_at,
        })
    }

    async fn quota(&self, client: &ClientId) -> Result<QuotaSnapshot, Error> {
        let key = CounterKey::new(CounterScope::FreeQuota, client.clone());
        let usage = self
            .counters
            .current(&key, &self.limits.free_quota, self.clock.utc())
            .await
            .map_err(map_counter_error)?;
        Ok(QuotaSnapshot {
            remaining: usage.remaining(&self.limits.free_quota),
            reset_at: usage.reset_at,
        })
    }
}
