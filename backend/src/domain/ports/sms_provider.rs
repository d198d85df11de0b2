//! Port for the outbound SMS carrier.
//!
//! Two adapters exist: a live carrier client and a simulator used when no
//! credentials are configured. The dispatch service treats both the same
//! way and only inspects the [`ProviderReceipt`] to decide how the record
//! settles.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{MessageBody, PhoneNumber};

use super::define_port_error;

define_port_error! {
    /// Failures reported by SMS provider adapters.
    ///
    /// The display text is the provider's own explanation; it is surfaced to
    /// callers in the error `details` and stored on the failed record.
    pub enum SmsProviderError {
        /// The carrier refused the message.
        Rejected { message: String } => "{message}",
        /// The carrier could not be reached.
        Transport { message: String } => "{message}",
        /// The carrier did not answer in time.
        Timeout { message: String } => "{message}",
        /// Credentials or endpoint settings are unusable.
        Misconfigured { message: String } => "{message}",
    }
}

/// A message ready for hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSms {
    /// Normalised destination.
    pub to: PhoneNumber,
    /// Full body.
    pub body: MessageBody,
}

/// What the provider reported after accepting a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderReceipt {
    /// The carrier accepted the message and assigned a reference.
    Delivered {
        /// Carrier-side message identifier.
        reference: String,
    },
    /// Nothing left the process; the record should report `sent` after
    /// `settle_after`.
    Simulated {
        /// Delay before the record settles.
        settle_after: Duration,
    },
}

/// Whether messages actually leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// A real carrier is configured.
    Live,
    /// Deliveries are simulated.
    Simulated,
}

impl ProviderMode {
    /// Short name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Simulated => "simulated",
        }
    }
}

/// Outbound carrier.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Hand one message to the carrier.
    async fn send(&self, sms: &OutboundSms) -> Result<ProviderReceipt, SmsProviderError>;

    /// Operating mode, fixed for the adapter's lifetime.
    fn mode(&self) -> ProviderMode;
}
