//! Model gateway trait — the abstraction over LLM backends.
//!
//! A gateway is stateless: given the ordered history and the tools on
//! offer, it produces the next assistant message. It either carries final
//! content or one or more tool-call requests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::GatewayError;
use crate::message::Message;

/// A single call to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// The conversation messages, in store order
    pub messages: Vec<Message>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Ephemeral system prompt hint for this call only (never stored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl GatewayRequest {
    pub fn new(messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            messages,
            tools,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The model's answer to a [`GatewayRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

impl GatewayResponse {
    pub fn new(message: Message, model: impl Into<String>) -> Self {
        Self {
            message,
            usage: None,
            model: model.into(),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core model gateway trait.
///
/// Every backend (hosted API, local model, scripted test double) implements
/// this. The agent loop never knows which one it is talking to.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// A human-readable name for this gateway (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Produce the next message for the given history.
    async fn complete(&self, request: GatewayRequest) -> std::result::Result<GatewayResponse, GatewayError>;
}
