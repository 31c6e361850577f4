//! File-based message store — persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `StoredMessage`. The log is loaded into
//! memory when the store is opened, and every append is written to disk
//! before it becomes visible to readers. This gives fast reads with durable
//! writes and keeps the file human-inspectable.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use toolloop_core::error::StoreError;
use toolloop_core::message::{Message, StoredMessage};
use toolloop_core::store::MessageStore;
use tracing::{debug, warn};

/// A file-backed message store using JSONL (one JSON object per line).
pub struct FileStore {
    path: PathBuf,
    records: Arc<RwLock<Vec<StoredMessage>>>,
    /// The file ends in a partial record with no trailing newline.
    torn_tail: AtomicBool,
}

impl FileStore {
    /// Open a store at the given path.
    ///
    /// If the file exists, records are loaded from it; otherwise the store
    /// starts empty and the file is created on first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let (records, torn_tail) = Self::load_from_disk(&path)?;
        debug!(path = %path.display(), count = records.len(), torn_tail, "File message store loaded");
        Ok(Self {
            path,
            records: Arc::new(RwLock::new(records)),
            torn_tail: AtomicBool::new(torn_tail),
        })
    }

    /// Default path: `~/.toolloop/history.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".toolloop").join("history.jsonl")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Result<(Vec<StoredMessage>, bool), StoreError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), false)),
            Err(e) => {
                return Err(StoreError::Read {
                    store: "file".into(),
                    reason: format!("Failed to read {}: {e}", path.display()),
                });
            }
        };

        let torn_tail = !content.is_empty() && !content.ends_with('\n');
        if torn_tail {
            warn!(path = %path.display(), "Store file ends in a partial record");
        }

        let records = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<StoredMessage>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted message record");
                    None
                }
            })
            .collect();
        Ok((records, torn_tail))
    }

    fn append_error(reason: String) -> StoreError {
        StoreError::Append {
            store: "file".into(),
            reason,
        }
    }

    /// Write a batch of records to the end of the file in one call.
    ///
    /// A torn last line is terminated first so the batch starts on a fresh line.
    async fn write_batch(&self, batch: &[StoredMessage]) -> Result<(), StoreError> {
        let mut content = String::new();
        if self.torn_tail.load(Ordering::Acquire) {
            content.push('\n');
        }
        for record in batch {
            let line = serde_json::to_string(record)
                .map_err(|e| Self::append_error(format!("Failed to serialize message: {e}")))?;
            content.push_str(&line);
            content.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::append_error(format!("Failed to create store directory: {e}")))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Self::append_error(format!("Failed to open {}: {e}", self.path.display())))?;
        let written: std::io::Result<()> = async {
            file.write_all(content.as_bytes()).await?;
            file.flush().await
        }
        .await;

        match written {
            Ok(()) => {
                self.torn_tail.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                // A partial write may leave an unterminated line behind.
                self.torn_tail.store(true, Ordering::Release);
                Err(Self::append_error(format!("Failed to write store file: {e}")))
            }
        }
    }
}

#[async_trait]
impl MessageStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(&self, messages: Vec<Message>) -> Result<(), StoreError> {
        let batch: Vec<StoredMessage> = messages.into_iter().map(StoredMessage::stamp).collect();

        // Hold the write guard across the disk write so readers see all or nothing.
        let mut records = self.records.write().await;
        self.write_batch(&batch).await?;
        debug!(path = %self.path.display(), count = batch.len(), "Appended messages");
        records.extend(batch);
        Ok(())
    }

    async fn read_records(&self) -> Result<Vec<StoredMessage>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
