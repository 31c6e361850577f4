//! Scratch note tool: lets the model keep notes in the run's scratch memory.

use async_trait::async_trait;
use serde::Deserialize;
use toolloop_core::error::BoxError;
use toolloop_core::tool::{Tool, ToolEnv};
use tracing::debug;

pub struct ScratchNoteTool;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum NoteAction {
    Get { key: String },
    Set { key: String, value: serde_json::Value },
}

#[async_trait]
impl Tool for ScratchNoteTool {
    fn name(&self) -> &str {
        "scratch_note"
    }

    fn description(&self) -> &str {
        "Read or write a note in scratch memory that persists for the rest of this run. \
         Use action 'set' with a key and value to save, 'get' with a key to read back."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["get", "set"],
                    "description": "Whether to read or write the note"
                },
                "key": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Note name"
                },
                "value": {
                    "description": "Value to store (required for 'set')"
                }
            },
            "required": ["action", "key"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        env: &ToolEnv<'_>,
    ) -> Result<serde_json::Value, BoxError> {
        let ctx = env
            .context
            .ok_or("scratch_note needs an execution context")?;
        let action: NoteAction = serde_json::from_value(arguments)?;

        match action {
            NoteAction::Get { key } => {
                let value = ctx.remember(&key).await;
                debug!(key = %key, found = value.is_some(), "Scratch note read");
                Ok(value.unwrap_or(serde_json::Value::Null))
            }
            NoteAction::Set { key, value } => {
                ctx.memorize(&key, value).await;
                debug!(key = %key, "Scratch note written");
                Ok(serde_json::json!({ "saved": key }))
            }
        }
    }
}
