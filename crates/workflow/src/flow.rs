//! Flows: ordered task chains, and a name-keyed registry of flows.

use crate::task::Task;
use serde_json::Value;
use std::collections::BTreeMap;
use toolloop_core::error::FlowError;
use toolloop_core::{ExecutionContext, Result};
use tracing::{debug, info, warn};

/// A named, ordered sequence of tasks.
///
/// Each task's output is the next task's input, and is recorded in scratch
/// memory under `flow:<flow>:<task>` once the task completes.
#[derive(Debug, Clone)]
pub struct Flow {
    name: String,
    tasks: Vec<Task>,
}

impl Flow {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Scratch key holding a task's latest output.
    pub fn memory_key(&self, task: &str) -> String {
        format!("flow:{}:{}", self.name, task)
    }

    /// Run every task in order, strictly one at a time.
    pub async fn run(&self, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        info!(flow = %self.name, tasks = self.tasks.len(), "Running flow");
        let mut current = input;
        for task in &self.tasks {
            current = self.run_one(task, current, ctx).await?;
        }
        Ok(current)
    }

    /// Run a single task of this flow by name.
    pub async fn run_task(&self, name: &str, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| FlowError::TaskNotFound {
                flow: self.name.clone(),
                task: name.to_string(),
            })?;
        self.run_one(task, input, ctx).await
    }

    async fn run_one(&self, task: &Task, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        ctx.log(format!("Flow {}: running task \"{}\"", self.name, task.name()));
        debug!(flow = %self.name, task = %task.name(), "Running task");

        let output = task.run(input, ctx).await.map_err(|e| {
            warn!(flow = %self.name, task = %task.name(), error = %e, "Task failed");
            FlowError::TaskFailed {
                flow: self.name.clone(),
                task: task.name().to_string(),
                source: Box::new(e),
            }
        })?;

        ctx.memorize(&self.memory_key(task.name()), output.clone()).await;
        Ok(output)
    }
}

/// Flows addressable by name.
#[derive(Debug, Default)]
pub struct FlowRegistry {
    flows: BTreeMap<String, Flow>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flow, returning the one it replaced (if any).
    pub fn register(&mut self, flow: Flow) -> Option<Flow> {
        let name = flow.name().to_string();
        let replaced = self.flows.insert(name.clone(), flow);
        if replaced.is_some() {
            warn!(flow = %name, "Replaced existing flow registration");
        }
        replaced
    }

    pub fn get(&self, name: &str) -> std::result::Result<&Flow, FlowError> {
        self.flows
            .get(name)
            .ok_or_else(|| FlowError::FlowNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.flows.keys().map(|s| s.as_str()).collect()
    }

    /// Look up a flow and run it.
    pub async fn run(&self, name: &str, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        self.get(name)?.run(input, ctx).await
    }
}
