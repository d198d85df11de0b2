//! In-memory [`MessageStore`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{MessageStore, MessageStoreError};
use crate::domain::{DeliveryOutcome, MessageId, MessageRecord};

/// Message records keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    records: Mutex<HashMap<MessageId, MessageRecord>>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<MessageId, MessageRecord>>, MessageStoreError> {
        self.records
            .lock()
            .map_err(|_| MessageStoreError::unavailable("message store lock poisoned"))
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert(&self, record: MessageRecord) -> Result<(), MessageStoreError> {
        let mut records = self.lock()?;
        match records.entry(record.id.clone()) {
            Entry::Occupied(existing) => Err(MessageStoreError::duplicate_id(existing.key().as_str())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn find(&self, id: &MessageId) -> Result<Option<MessageRecord>, MessageStoreError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn settle(
        &self,
        id: &MessageId,
        outcome: DeliveryOutcome,
    ) -> Result<MessageRecord, MessageStoreError> {
        let mut records = self.lock()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| MessageStoreError::unknown_id(id.as_str()))?;
        record
            .settle(outcome)
            .map_err(|err| MessageStoreError::transition(err.to_string()))?;
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, MessageBody, MessageStatus, PhoneNumber};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn record(id: &str) -> MessageRecord {
        MessageRecord::pending(
            MessageId::new(id).expect("id"),
            PhoneNumber::parse("+447911123456").expect("phone"),
            &MessageBody::new("Hello").expect("body"),
            ClientId::new("198.51.100.4").expect("client"),
            Utc::now(),
        )
    }

    #[fixture]
    fn store() -> InMemoryMessageStore {
        InMemoryMessageStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn inserted_records_can_be_found(store: InMemoryMessageStore) {
        store.insert(record("abc")).await.expect("insert");
        let found = store
            .find(&MessageId::new("abc").expect("id"))
            .await
            .expect("find")
            .expect("record present");
        assert_eq!(found.status, MessageStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_ids_are_rejected(store: InMemoryMessageStore) {
        store.insert(record("abc")).await.expect("first insert");
        let err = store.insert(record("abc")).await.expect_err("duplicate");
        assert_eq!(err, MessageStoreError::duplicate_id("abc"));
    }

    #[rstest]
    #[tokio::test]
    async fn records_settle_exactly_once(store: InMemoryMessageStore) {
        let id = MessageId::new("abc").expect("id");
        store.insert(record("abc")).await.expect("insert");

        let sent = store
            .settle(
                &id,
                DeliveryOutcome::Sent {
                    provider_ref: Some("SM1".to_owned()),
                },
            )
            .await
            .expect("first settle");
        assert_eq!(sent.status, MessageStatus::Sent);
        assert_eq!(sent.provider_ref.as_deref(), Some("SM1"));

        let err = store
            .settle(
                &id,
                DeliveryOutcome::Failed {
                    reason: "late".to_owned(),
                },
            )
            .await
            .expect_err("second settle");
        assert!(matches!(err, MessageStoreError::Transition { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn settling_unknown_ids_fails(store: InMemoryMessageStore) {
        let err = store
            .settle(
                &MessageId::new("missing").expect("id"),
                DeliveryOutcome::Sent { provider_ref: None },
            )
            .await
            .expect_err("unknown id");
        assert_eq!(err, MessageStoreError::unknown_id("missing"));
    }
}
