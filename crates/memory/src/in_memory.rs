//! In-memory message store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use toolloop_core::error::StoreError;
use toolloop_core::message::{Message, StoredMessage};
use toolloop_core::store::MessageStore;

/// A volatile store that keeps records in a Vec.
///
/// Cloning shares the underlying log.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<StoredMessage>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with existing history.
    pub fn with_history(messages: Vec<Message>) -> Self {
        Self {
            records: Arc::new(RwLock::new(
                messages.into_iter().map(StoredMessage::stamp).collect(),
            )),
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    fn name(&self) -> &str { "in_memory" }

    async fn append(&self, messages: Vec<Message>) -> Result<(), StoreError> {
        let batch: Vec<StoredMessage> = messages.into_iter().map(StoredMessage::stamp).collect();
        // One write guard for the whole batch
        self.records.write().await.extend(batch);
        Ok(())
    }

    async fn read_records(&self) -> Result<Vec<StoredMessage>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
