//! Scratch memory: ephemeral key/value notes attached to one run.
//!
//! Scratch memory is not part of the durable message log. Tasks and tools
//! use it to leave notes for later turns or later tasks in a flow.

use async_trait::async_trait;

/// The core ScratchMemory trait.
///
/// Repeated `set` calls for the same key are last-write-wins.
#[async_trait]
pub trait ScratchMemory: Send + Sync {
    /// Read a value.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: serde_json::Value);

    /// Remove a value. Returns whether it existed.
    async fn remove(&self, key: &str) -> bool;

    /// All keys currently held, sorted.
    async fn keys(&self) -> Vec<String>;

    /// Drop everything.
    async fn clear(&self);
}
