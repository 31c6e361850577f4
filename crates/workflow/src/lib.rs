//! Flow/task composition for toolloop.
//!
//! A [`Flow`] is a named, ordered chain of [`Task`]s. Each task consumes the
//! previous task's output together with the shared [`ExecutionContext`],
//! and its output is recorded in scratch memory under
//! `flow:<flow>:<task>`. Tasks never run concurrently within a flow.
//!
//! A task's system prompt reaches its handler through a scoped copy of the
//! context, so flows sharing one context cannot see each other's prompts.
//! [`AgentTask`] plugs a full agent loop into a chain.
//!
//! [`ExecutionContext`]: toolloop_core::ExecutionContext

pub mod agent_task;
pub mod flow;
pub mod task;

pub use agent_task::AgentTask;
pub use flow::{Flow, FlowRegistry};
pub use task::{FnTask, Task, TaskHandler};
