//! Port for the audit log of send requests.
//!
//! Every accepted request leaves a [`MessageRecord`] that starts `pending`
//! and later settles exactly once. Adapters own the id-uniqueness check and
//! must apply [`MessageRecord::settle`] atomically with respect to other
//! writers of the same record.

use async_trait::async_trait;

use crate::domain::{DeliveryOutcome, MessageId, MessageRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message store adapters.
    pub enum MessageStoreError {
        /// A record with this identifier already exists.
        DuplicateId { id: String } => "message id already in use: {id}",
        /// No record exists for this identifier.
        UnknownId { id: String } => "message not found: {id}",
        /// The record has already left `pending`.
        Transition { message: String } => "message status transition rejected: {message}",
        /// The backing store could not be used.
        Unavailable { message: String } => "message store unavailable: {message}",
    }
}

/// Storage for [`MessageRecord`]s keyed by [`MessageId`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new record.
    ///
    /// Fails with [`MessageStoreError::DuplicateId`] when the id is taken;
    /// callers draw a new id and retry.
    async fn insert(&self, record: MessageRecord) -> Result<(), MessageStoreError>;

    /// Fetch a record by id.
    async fn find(&self, id: &MessageId) -> Result<Option<MessageRecord>, MessageStoreError>;

    /// Move a `pending` record to its terminal status and return the result.
    async fn settle(
        &self,
        id: &MessageId,
        outcome: DeliveryOutcome,
    ) -> Result<MessageRecord, MessageStoreError>;
}
