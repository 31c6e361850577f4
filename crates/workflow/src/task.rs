//! Tasks: one named step of a flow.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use toolloop_core::{ExecutionContext, Result};

/// The work a task performs.
///
/// The context a handler receives is already scoped to its task: its
/// `task_prompt()` is the task's own system prompt.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self, input: Value, ctx: &ExecutionContext) -> Result<Value>;
}

/// Adapts an async closure into a [`TaskHandler`].
pub struct FnTask<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> TaskHandler for FnTask<F>
where
    F: Fn(Value, ExecutionContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    async fn run(&self, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        (self.f)(input, ctx.clone()).await
    }
}

/// A named step with an optional system prompt hint.
#[derive(Clone)]
pub struct Task {
    name: String,
    description: String,
    system_prompt: Option<String>,
    handler: Arc<dyn TaskHandler>,
}

impl Task {
    pub fn new(name: impl Into<String>, handler: impl TaskHandler + 'static) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            system_prompt: None,
            handler: Arc::new(handler),
        }
    }

    /// A task whose handler is an async closure over the input and context.
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::new(name, FnTask { f })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Run the handler against a copy of `ctx` carrying this task's prompt.
    ///
    /// The caller's context is left untouched.
    pub async fn run(&self, input: Value, ctx: &ExecutionContext) -> Result<Value> {
        let scoped = ctx.scoped(self.system_prompt.clone());
        self.handler.run(input, &scoped).await
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}
