//! Execution context — the run-scoped aggregate shared by the loop, tools
//! and composed tasks.
//!
//! A context bundles the gateway, the message store, the tool registry and a
//! scratch memory, plus an optional task prompt hint. Cloning is cheap (all
//! collaborators are behind `Arc`), and [`ExecutionContext::scoped`] gives a
//! task its own prompt without touching the caller's context.

use std::sync::Arc;
use tracing::debug;
use crate::error::ToolError;
use crate::gateway::ModelGateway;
use crate::memory::ScratchMemory;
use crate::store::MessageStore;
use crate::tool::{Tool, ToolRegistry};

#[derive(Clone)]
pub struct ExecutionContext {
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn MessageStore>,
    tools: Arc<ToolRegistry>,
    scratch: Arc<dyn ScratchMemory>,
    task_prompt: Option<String>,
    debug: bool,
}

impl ExecutionContext {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn MessageStore>,
        tools: Arc<ToolRegistry>,
        scratch: Arc<dyn ScratchMemory>,
    ) -> Self {
        Self {
            gateway,
            store,
            tools,
            scratch,
            task_prompt: None,
            debug: false,
        }
    }

    /// Enable or disable [`ExecutionContext::log`] output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the task prompt hint on this context.
    pub fn with_task_prompt(mut self, prompt: Option<String>) -> Self {
        self.task_prompt = prompt;
        self
    }

    /// A copy sharing every collaborator but carrying its own task prompt.
    pub fn scoped(&self, task_prompt: Option<String>) -> Self {
        self.clone().with_task_prompt(task_prompt)
    }

    pub fn gateway(&self) -> &Arc<dyn ModelGateway> {
        &self.gateway
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn scratch(&self) -> &Arc<dyn ScratchMemory> {
        &self.scratch
    }

    pub fn task_prompt(&self) -> Option<&str> {
        self.task_prompt.as_deref()
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Look up a registered tool.
    pub fn get_tool(&self, name: &str) -> std::result::Result<&dyn Tool, ToolError> {
        self.tools.get(name)
    }

    /// Read a scratch note.
    pub async fn remember(&self, key: &str) -> Option<serde_json::Value> {
        self.scratch.get(key).await
    }

    /// Write a scratch note (last write wins).
    pub async fn memorize(&self, key: &str, value: serde_json::Value) {
        self.scratch.set(key, value).await;
    }

    /// Observational debug output. Does nothing unless debug is enabled.
    pub fn log(&self, message: impl AsRef<str>) {
        if self.debug {
            debug!(target: "toolloop::context", "{}", message.as_ref());
        }
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("gateway", &self.gateway.name())
            .field("store", &self.store.name())
            .field("tools", &self.tools.names())
            .field("task_prompt", &self.task_prompt)
            .field("debug", &self.debug)
            .finish()
    }
}
