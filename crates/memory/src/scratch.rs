//! In-memory scratch memory for a single run.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use toolloop_core::memory::ScratchMemory;

/// A key/value scratchpad held in a HashMap.
#[derive(Clone, Default)]
pub struct InMemoryScratch {
    entries: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scratchpad seeded with initial entries.
    pub fn with_entries(initial: impl IntoIterator<Item = (String, serde_json::Value)>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(initial.into_iter().collect())),
        }
    }
}

#[async_trait]
impl ScratchMemory for InMemoryScratch {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: serde_json::Value) {
        self.entries.write().await.insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
