//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod message_dispatch;
mod message_store;
mod sms_provider;
mod window_counter_store;

#[cfg(test)]
pub use message_dispatch::MockMessageDispatch;
pub use message_dispatch::{
    MessageDispatch, QuotaRemaining, QuotaSnapshot, SubmitTextRequest, SubmitTextResponse,
    TextStatusResponse,
};
#[cfg(test)]
pub use message_store::MockMessageStore;
pub use message_store::{MessageStore, MessageStoreError};
#[cfg(test)]
pub use sms_provider::MockSmsProvider;
pub use sms_provider::{
    OutboundSms, ProviderMode, ProviderReceipt, SmsProvider, SmsProviderError,
};
#[cfg(test)]
pub use window_counter_store::MockWindowCounterStore;
pub use window_counter_store::{AcquireOutcome, WindowCounterStore, WindowCounterStoreError};
