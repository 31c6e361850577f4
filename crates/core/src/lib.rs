//! # toolloop core
//!
//! Domain types, traits, and error definitions for the toolloop agent runtime.
//! This crate defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the agent loop is defined as a trait here:
//! - [`ModelGateway`] produces the next message from the history
//! - [`MessageStore`] is the append-only conversation log
//! - [`Tool`] is one invokable capability, looked up through [`ToolRegistry`]
//! - [`ScratchMemory`] holds run-scoped notes
//!
//! Implementations live in their respective crates, and tests swap in
//! scripted doubles.

pub mod error;
pub mod message;
pub mod gateway;
pub mod tool;
pub mod store;
pub mod memory;
pub mod context;
pub mod agent;

// Re-export key types at crate root for ergonomics
pub use error::{BoxError, Error, Result};
pub use message::{Message, MessageToolCall, Role, StoredMessage};
pub use gateway::{GatewayRequest, GatewayResponse, ModelGateway, ToolDefinition, Usage};
pub use tool::{Tool, ToolEnv, ToolRegistry, ToolResult};
pub use store::MessageStore;
pub use memory::ScratchMemory;
pub use context::ExecutionContext;
pub use agent::{LoopState, MultiToolCallPolicy, StopReason};
