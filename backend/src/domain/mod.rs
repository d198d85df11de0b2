//! Domain primitives, ports and the dispatch service.
//!
//! Purpose: define strongly typed values used by the HTTP adapter and the
//! outbound adapters, and the orchestration that ties them together. Nothing
//! in here depends on Actix or on a concrete store or carrier.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - PhoneNumber / MessageBody / MessageId: validated request values.
//! - MessageRecord / MessageStatus: the audit record and its state machine.
//! - ClientId / SendTier: who is charged and how.
//! - WindowPolicy / WindowUsage / CounterKey: fixed-window accounting.
//! - MessageDispatchService: implementation of the `MessageDispatch` port.

pub mod dispatch;
pub mod error;
pub mod ports;

mod client;
mod message;
mod phone;
mod trace_id;
mod window;

pub use self::client::{ClientId, ClientIdValidationError, DEFAULT_FREE_TIER_KEY, SendTier};
pub use self::dispatch::{DispatchLimits, MessageDispatchService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::message::{
    DeliveryOutcome, MESSAGE_MAX_CHARS, MESSAGE_PREVIEW_CHARS, MessageBody, MessageId,
    MessageIdValidationError, MessageRecord, MessageStatus, MessageValidationError,
    StatusTransitionError,
};
pub use self::phone::{PhoneNumber, PhoneValidationError, is_plausible_phone, normalize_phone};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::window::{CounterKey, CounterScope, WindowPolicy, WindowPolicyError, WindowUsage};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use smsgate::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("Message not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
