//! Process-local adapters for the store ports.
//!
//! State lives behind `std::sync::Mutex` and is lost on restart. Critical
//! sections are short and never span an `.await`; a poisoned lock surfaces
//! as the port's `Unavailable` error rather than a panic.

mod message_store;
mod window_counter_store;

pub use message_store::InMemoryMessageStore;
pub use window_counter_store::InMemoryWindowCounterStore;
