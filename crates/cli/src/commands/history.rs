//! `toolloop history`: print a stored conversation.

use std::path::{Path, PathBuf};
use toolloop_core::{MessageStore, StoredMessage};
use toolloop_memory::FileStore;

pub async fn run(
    config_path: Option<&Path>,
    store: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let path = super::history_path(&config, store);

    let store = FileStore::open(&path)?;
    let records = store.read_records().await?;

    if records.is_empty() {
        println!("No messages in {}", path.display());
        return Ok(());
    }

    for record in &records {
        println!("{}", render(record));
    }
    Ok(())
}

/// One line per message: timestamp, role, then text or tool-call summary.
fn render(record: &StoredMessage) -> String {
    let msg = &record.message;
    let stamp = record.created_at.format("%Y-%m-%d %H:%M:%S");
    let mut line = format!("[{stamp}] {:<9}", msg.role.to_string());

    if let Some(id) = &msg.tool_call_id {
        line.push_str(&format!(" ({id})"));
    }
    if msg.has_content() {
        line.push(' ');
        line.push_str(&msg.content);
    }
    for call in &msg.tool_calls {
        line.push_str(&format!(" -> {}({}) [{}]", call.name, call.arguments, call.id));
    }
    line
}
