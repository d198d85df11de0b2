//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local message and window-counter stores.
//! - **sms**: Twilio REST client and the delivery simulator.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod memory;
pub mod sms;
