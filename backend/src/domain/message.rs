//! Message bodies, identifiers and the auditable delivery record.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ClientId, PhoneNumber};

/// Maximum body length in characters (ten concatenated SMS segments).
pub const MESSAGE_MAX_CHARS: usize = 1600;

/// Number of characters retained in the stored preview.
pub const MESSAGE_PREVIEW_CHARS: usize = 100;

const MESSAGE_ID_LEN: usize = 12;
const MESSAGE_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Validation failures for message bodies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageValidationError {
    /// No body was supplied.
    #[error("Message is required")]
    Missing,
    /// The body exceeds [`MESSAGE_MAX_CHARS`].
    #[error("Message must be between 1 and {max} characters")]
    TooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Message text accepted for delivery.
///
/// ## Invariants
/// - Between 1 and [`MESSAGE_MAX_CHARS`] characters (Unicode scalar values).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate a message body.
    ///
    /// # Examples
    /// ```
    /// use smsgate::domain::{MessageBody, MESSAGE_MAX_CHARS};
    ///
    /// assert!(MessageBody::new("Hello").is_ok());
    /// assert!(MessageBody::new("x".repeat(MESSAGE_MAX_CHARS)).is_ok());
    /// assert!(MessageBody::new("x".repeat(MESSAGE_MAX_CHARS + 1)).is_err());
    /// ```
    pub fn new(body: impl Into<String>) -> Result<Self, MessageValidationError> {
        let body = body.into();
        if body.is_empty() {
            return Err(MessageValidationError::Missing);
        }
        if body.chars().count() > MESSAGE_MAX_CHARS {
            return Err(MessageValidationError::TooLong {
                max: MESSAGE_MAX_CHARS,
            });
        }
        Ok(Self(body))
    }

    /// Borrow the full body.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Truncated copy kept in the audit record.
    ///
    /// Bodies longer than [`MESSAGE_PREVIEW_CHARS`] are cut and suffixed
    /// with `...`.
    pub fn preview(&self) -> String {
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(MESSAGE_PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Opaque message identifier handed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

/// Validation failures for externally supplied identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageIdValidationError {
    /// The identifier was empty after trimming.
    #[error("message identifier must not be empty")]
    Empty,
}

impl MessageId {
    /// Wrap a caller-supplied identifier for lookup.
    pub fn new(raw: impl Into<String>) -> Result<Self, MessageIdValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(MessageIdValidationError::Empty);
        }
        Ok(Self(raw))
    }

    /// Draw a fresh lowercase base-36 identifier.
    ///
    /// Uniqueness is enforced by the message store; callers regenerate on
    /// collision.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let id = (0..MESSAGE_ID_LEN)
            .map(|_| {
                let index = rng.gen_range(0..MESSAGE_ID_ALPHABET.len());
                char::from(MESSAGE_ID_ALPHABET[index])
            })
            .collect();
        Self(id)
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<MessageId> for String {
    fn from(value: MessageId) -> Self {
        value.0
    }
}

/// Delivery status of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Accepted locally; provider outcome not yet known.
    Pending,
    /// The provider accepted the message (or the simulation settled).
    Sent,
    /// The provider rejected the message.
    Failed,
}

impl MessageStatus {
    /// Wire name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is allowed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Delivery succeeded, optionally with the provider's reference.
    Sent {
        /// Provider-side message identifier.
        provider_ref: Option<String>,
    },
    /// Delivery failed with the provider's explanation.
    Failed {
        /// Raw provider error text.
        reason: String,
    },
}

/// Attempted to settle a message that already left `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("message {id} is already {status}")]
pub struct StatusTransitionError {
    /// Message that was targeted.
    pub id: MessageId,
    /// Its terminal status.
    pub status: MessageStatus,
}

/// Audit record for one send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Opaque identifier returned to the caller.
    pub id: MessageId,
    /// Normalised destination.
    pub phone: PhoneNumber,
    /// Truncated body; see [`MessageBody::preview`].
    pub preview: String,
    /// When the request was accepted.
    pub created_at: DateTime<Utc>,
    /// Client the request came from.
    pub origin: ClientId,
    /// Current delivery status.
    pub status: MessageStatus,
    /// Provider reference once sent.
    pub provider_ref: Option<String>,
    /// Provider error text once failed.
    pub error: Option<String>,
}

impl MessageRecord {
    /// Build a fresh `pending` record.
    pub fn pending(
        id: MessageId,
        phone: PhoneNumber,
        body: &MessageBody,
        origin: ClientId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            phone,
            preview: body.preview(),
            created_at,
            origin,
            status: MessageStatus::Pending,
            provider_ref: None,
            error: None,
        }
    }

    /// Apply the delivery outcome; only `pending` records may settle.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use smsgate::domain::{
    ///     ClientId, DeliveryOutcome, MessageBody, MessageId, MessageRecord, MessageStatus,
    ///     PhoneNumber,
    /// };
    ///
    /// let mut record = MessageRecord::pending(
    ///     MessageId::new("abc").expect("id"),
    ///     PhoneNumber::parse("5551234567").expect("phone"),
    ///     &MessageBody::new("Hello").expect("body"),
    ///     ClientId::new("203.0.113.7").expect("client"),
    ///     Utc::now(),
    /// );
    /// record.settle(DeliveryOutcome::Sent { provider_ref: None }).expect("pending settles");
    /// assert_eq!(record.status, MessageStatus::Sent);
    /// assert!(record.settle(DeliveryOutcome::Failed { reason: "late".into() }).is_err());
    /// ```
    pub fn settle(&mut self, outcome: DeliveryOutcome) -> Result<(), StatusTransitionError> {
        if self.status.is_terminal() {
            return Err(StatusTransitionError {
                id: self.id.clone(),
                status: self.status,
            });
        }
        match outcome {
            DeliveryOutcome::Sent { provider_ref } => {
                self.status = MessageStatus::Sent;
                self.provider_ref = provider_ref;
            }
            DeliveryOutcome::Failed { reason } => {
                self.status = MessageStatus::Failed;
                self.error = Some(reason);
            }
        }
        Ok(())
    }
}
