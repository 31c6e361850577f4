//! Current time tool: reports the current UTC time.
//!
//! Without arguments the time is returned as RFC 3339. An optional
//! `format` argument takes a chrono strftime pattern.

use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use toolloop_core::error::BoxError;
use toolloop_core::tool::{Tool, ToolEnv};

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "current_time"
    }

    fn description(&self) -> &str {
        "Get the current date and time in UTC. Optionally pass a strftime format such as '%Y-%m-%d'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "format": {
                    "type": "string",
                    "description": "chrono strftime pattern, e.g. '%A %H:%M'. Defaults to RFC 3339."
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _env: &ToolEnv<'_>,
    ) -> Result<serde_json::Value, BoxError> {
        let now = Utc::now();
        let rendered = match arguments.get("format").and_then(|f| f.as_str()) {
            Some(pattern) => format_time(now, pattern)?,
            None => now.to_rfc3339(),
        };
        Ok(serde_json::Value::String(rendered))
    }
}

/// Render `time` with a strftime pattern, rejecting malformed patterns.
pub fn format_time(time: DateTime<Utc>, pattern: &str) -> Result<String, BoxError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid time format '{pattern}'").into());
    }
    Ok(time.format_with_items(items.into_iter()).to_string())
}
