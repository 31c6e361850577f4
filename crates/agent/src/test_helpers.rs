//! Shared test helpers for loop tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use toolloop_core::error::{BoxError, GatewayError, StoreError};
use toolloop_core::gateway::{GatewayRequest, GatewayResponse, ModelGateway, Usage};
use toolloop_core::message::{Message, MessageToolCall, StoredMessage};
use toolloop_core::store::MessageStore;
use toolloop_core::tool::{Tool, ToolEnv, ToolRegistry};
use toolloop_core::ExecutionContext;
use toolloop_memory::{InMemoryScratch, InMemoryStore};

/// A gateway that replays scripted responses in order and records every
/// request it receives.
///
/// Once the script runs out it repeats the fallback response, if any, and
/// otherwise reports itself unavailable.
pub struct ScriptedGateway {
    script: Mutex<Vec<Result<GatewayResponse, GatewayError>>>,
    fallback: Option<GatewayResponse>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<GatewayResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A gateway that answers every call with the same response.
    pub fn repeating(response: GatewayResponse) -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            fallback: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A gateway whose first call fails.
    pub fn failing(error: GatewayError) -> Self {
        Self {
            script: Mutex::new(vec![Err(error)]),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        self.requests.lock().unwrap().push(request);
        let mut script = self.script.lock().unwrap();
        if !script.is_empty() {
            return script.remove(0);
        }
        self.fallback
            .clone()
            .ok_or_else(|| GatewayError::Unavailable("script exhausted".into()))
    }
}

pub fn response(message: Message) -> GatewayResponse {
    GatewayResponse {
        message,
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "scripted-model".into(),
    }
}

/// A final-content response.
pub fn text_response(text: &str) -> GatewayResponse {
    response(Message::assistant(text))
}

/// A response requesting tool calls.
pub fn tool_response(calls: Vec<MessageToolCall>) -> GatewayResponse {
    response(Message::assistant_tool_calls(calls))
}

/// A store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn append(&self, _messages: Vec<Message>) -> Result<(), StoreError> {
        Err(StoreError::Append {
            store: "failing".into(),
            reason: "disk full".into(),
        })
    }

    async fn read_records(&self) -> Result<Vec<StoredMessage>, StoreError> {
        Err(StoreError::Read {
            store: "failing".into(),
            reason: "disk gone".into(),
        })
    }
}

/// Echoes its `text` argument.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echoes back the input"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        })
    }
    async fn execute(
        &self,
        arguments: serde_json::Value,
        _env: &ToolEnv<'_>,
    ) -> Result<serde_json::Value, BoxError> {
        Ok(arguments["text"].clone())
    }
}

/// Always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }
    fn description(&self) -> &str {
        "Never works"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
    async fn execute(
        &self,
        _arguments: serde_json::Value,
        _env: &ToolEnv<'_>,
    ) -> Result<serde_json::Value, BoxError> {
        Err("disk on fire".into())
    }
}

/// Reports what the runtime environment carried.
pub struct WhoAmITool;

#[async_trait]
impl Tool for WhoAmITool {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Reports the user input and whether a context is present"
    }
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({ "type": "object" })
    }
    async fn execute(
        &self,
        _arguments: serde_json::Value,
        env: &ToolEnv<'_>,
    ) -> Result<serde_json::Value, BoxError> {
        let ctx = if env.context.is_some() { "context" } else { "none" };
        Ok(serde_json::json!(format!("{}|{}", env.user_input, ctx)))
    }
}

pub fn test_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    registry.register(Box::new(BrokenTool));
    registry.register(Box::new(WhoAmITool));
    registry
}

/// A context over an in-memory store; the returned store shares its log.
pub fn context_with(gateway: Arc<ScriptedGateway>) -> (ExecutionContext, InMemoryStore) {
    let store = InMemoryStore::new();
    let ctx = context_with_store(gateway, Arc::new(store.clone()));
    (ctx, store)
}

pub fn context_with_store(
    gateway: Arc<ScriptedGateway>,
    store: Arc<dyn MessageStore>,
) -> ExecutionContext {
    ExecutionContext::new(
        gateway,
        store,
        Arc::new(test_registry()),
        Arc::new(InMemoryScratch::new()),
    )
}
