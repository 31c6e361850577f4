//! Message store trait — the append-only conversation log.
//!
//! The store is the only source of truth for what has been said. Appends
//! are atomic with respect to readers of the same instance and are never
//! retried here; retry policy belongs to the caller.

use async_trait::async_trait;
use crate::error::StoreError;
use crate::message::{Message, StoredMessage};

/// The core MessageStore trait.
///
/// Implementations: in-memory (volatile), JSON-lines file (durable).
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Append a batch of messages in order.
    ///
    /// Each message is stamped with an id and a creation time before it is
    /// persisted. Readers never observe a partially appended batch.
    async fn append(&self, messages: Vec<Message>) -> std::result::Result<(), StoreError>;

    /// All persisted records, metadata included, in insertion order.
    async fn read_records(&self) -> std::result::Result<Vec<StoredMessage>, StoreError>;

    /// All messages in insertion order with persistence metadata stripped.
    async fn read_all(&self) -> std::result::Result<Vec<Message>, StoreError> {
        Ok(self
            .read_records()
            .await?
            .into_iter()
            .map(StoredMessage::into_message)
            .collect())
    }

    /// Number of stored messages.
    async fn len(&self) -> std::result::Result<usize, StoreError> {
        Ok(self.read_records().await?.len())
    }
}
