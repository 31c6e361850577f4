//! A task that runs a full agent loop.

use crate::task::TaskHandler;
use async_trait::async_trait;
use serde_json::Value;
use toolloop_agent::AgentLoop;
use toolloop_core::{ExecutionContext, Result};

/// Runs an [`AgentLoop`] over the task's scoped context.
///
/// A string input becomes the user turn verbatim; any other value is sent
/// as its JSON text. The output is the final answer as a JSON string.
pub struct AgentTask {
    name: String,
    description: String,
    max_turns: Option<u32>,
}

impl AgentTask {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            max_turns: None,
        }
    }

    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = Some(max);
        self
    }
}

#[async_trait]
impl TaskHandler for AgentTask {
    async fn run(&self, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        let prompt = match input {
            Value::String(text) => text,
            other => other.to_string(),
        };

        let mut agent = AgentLoop::new(self.name.clone(), self.description.clone(), ctx.clone());
        if let Some(max) = self.max_turns {
            agent = agent.with_max_turns(max);
        }

        let answer = agent.run_text(prompt).await?;
        Ok(Value::String(answer))
    }
}
