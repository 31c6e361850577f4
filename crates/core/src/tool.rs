//! Tool trait and registry — the abstraction over agent capabilities.
//!
//! Every tool receives the same inputs: its validated JSON arguments plus a
//! [`ToolEnv`] bundling the ambient run data. The registry owns name lookup,
//! argument parsing and JSON Schema validation, so tools only see arguments
//! that already match their declared schema.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use crate::context::ExecutionContext;
use crate::error::{BoxError, ToolError};
use crate::gateway::ToolDefinition;
use crate::message::{Message, MessageToolCall};

/// Ambient data available to every tool invocation.
///
/// Tools ignore the fields they do not need.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolEnv<'a> {
    /// The original user input that started the run
    pub user_input: &'a str,

    /// The run's execution context, when the caller has one
    pub context: Option<&'a ExecutionContext>,
}

impl<'a> ToolEnv<'a> {
    pub fn new(user_input: &'a str, context: Option<&'a ExecutionContext>) -> Self {
        Self { user_input, context }
    }
}

/// The result of a successful dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// The tool that produced it
    pub tool_name: String,

    /// The output rendered as message content
    pub content: String,

    /// The raw structured output
    pub data: serde_json::Value,
}

impl ToolResult {
    /// The role=tool message that records this result.
    pub fn to_message(&self) -> Message {
        Message::tool_result(&self.call_id, &self.content)
    }
}

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "current_time").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with already-validated arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        env: &ToolEnv<'_>,
    ) -> std::result::Result<serde_json::Value, BoxError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A name-keyed table of available tools.
///
/// Listing order is stable (sorted by name). Registering a tool under an
/// existing name replaces the prior entry.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, returning the one it replaced (if any).
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Option<Box<dyn Tool>> {
        let name = tool.name().to_string();
        let replaced = self.tools.insert(name.clone(), tool);
        if replaced.is_some() {
            warn!(tool = %name, "Replaced existing tool registration");
        }
        replaced
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> std::result::Result<&dyn Tool, ToolError> {
        self.tools
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool definitions, in stable order (for sending to the model).
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve, parse, validate and execute exactly one tool call.
    pub async fn dispatch(
        &self,
        call_id: &str,
        tool_name: &str,
        raw_arguments: &str,
        env: &ToolEnv<'_>,
    ) -> std::result::Result<ToolResult, ToolError> {
        let tool = self.get(tool_name)?;

        let arguments = parse_arguments(tool_name, raw_arguments)?;
        validate_arguments(tool_name, &tool.parameters_schema(), &arguments)?;

        debug!(tool = %tool_name, call_id = %call_id, "Dispatching tool call");

        let data = tool
            .execute(arguments, env)
            .await
            .map_err(|source| ToolError::Execution {
                tool_name: tool_name.to_string(),
                source,
            })?;

        Ok(ToolResult {
            call_id: call_id.to_string(),
            tool_name: tool_name.to_string(),
            content: render_output(&data),
            data,
        })
    }

    /// Dispatch a tool call exactly as the model issued it.
    pub async fn dispatch_call(
        &self,
        call: &MessageToolCall,
        env: &ToolEnv<'_>,
    ) -> std::result::Result<ToolResult, ToolError> {
        self.dispatch(&call.id, &call.name, &call.arguments, env).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the raw argument string. Blank input means "no arguments".
fn parse_arguments(tool_name: &str, raw: &str) -> std::result::Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::ArgumentParse {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    })
}

/// Validate arguments against the tool's JSON Schema, collecting every violation.
fn validate_arguments(
    tool_name: &str,
    schema: &serde_json::Value,
    arguments: &serde_json::Value,
) -> std::result::Result<(), ToolError> {
    let validator = jsonschema::Validator::new(schema).map_err(|e| ToolError::Execution {
        tool_name: tool_name.to_string(),
        source: format!("invalid tool schema: {e}").into(),
    })?;
    if validator.is_valid(arguments) {
        return Ok(());
    }
    let violations = validator
        .iter_errors(arguments)
        .map(|e| e.to_string())
        .collect();
    Err(ToolError::ArgumentValidation {
        tool_name: tool_name.to_string(),
        violations,
    })
}

/// Strings are used verbatim; anything else is compact JSON.
fn render_output(data: &serde_json::Value) -> String {
    match data {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
            _env: &ToolEnv<'_>,
        ) -> std::result::Result<serde_json::Value, BoxError> {
            Ok(arguments["text"].clone())
        }
    }

    /// Reports what it saw in its environment.
    struct EnvProbe;

    #[async_trait]
    impl Tool for EnvProbe {
        fn name(&self) -> &str { "probe" }
        fn description(&self) -> &str { "Returns the user input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object" })
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
            env: &ToolEnv<'_>,
        ) -> std::result::Result<serde_json::Value, BoxError> {
            Ok(serde_json::json!({
                "user_input": env.user_input,
                "has_context": env.context.is_some(),
            }))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str { "broken" }
        fn description(&self) -> &str { "Always fails" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object" })
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
            _env: &ToolEnv<'_>,
        ) -> std::result::Result<serde_json::Value, BoxError> {
            Err("disk on fire".into())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(EnvProbe));
        registry.register(Box::new(FailingTool));
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("echo").is_ok());
        assert!(matches!(registry.get("nonexistent"), Err(ToolError::NotFound(_))));
    }

    #[test]
    fn describe_all_is_sorted_and_stable() {
        let registry = registry();
        let names: Vec<String> = registry.describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["broken", "echo", "probe"]);
        let again: Vec<String> = registry.describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn reregistration_replaces() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Box::new(EchoTool)).is_none());
        assert!(registry.register(Box::new(EchoTool)).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn dispatch_executes_tool() {
        let result = registry()
            .dispatch("call_1", "echo", r#"{"text":"hello world"}"#, &ToolEnv::default())
            .await
            .unwrap();
        assert_eq!(result.call_id, "call_1");
        assert_eq!(result.content, "hello world");

        let msg = result.to_message();
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.content, "hello world");
    }

    #[tokio::test]
    async fn dispatch_missing_tool() {
        let err = registry()
            .dispatch("call_1", "nonexistent", "{}", &ToolEnv::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(name) if name == "nonexistent"));
    }

    #[tokio::test]
    async fn dispatch_rejects_malformed_json() {
        let err = registry()
            .dispatch("call_1", "echo", "{not json", &ToolEnv::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ArgumentParse { .. }));
    }

    #[tokio::test]
    async fn dispatch_reports_schema_violations() {
        let err = registry()
            .dispatch("call_1", "echo", r#"{"text": 7}"#, &ToolEnv::default())
            .await
            .unwrap_err();
        match err {
            ToolError::ArgumentValidation { tool_name, violations } => {
                assert_eq!(tool_name, "echo");
                assert!(!violations.is_empty());
            }
            other => panic!("Expected ArgumentValidation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_arguments_mean_empty_object() {
        let err = registry()
            .dispatch("call_1", "echo", "  ", &ToolEnv::default())
            .await
            .unwrap_err();
        // Parsed as {} and then rejected for the missing "text" field.
        assert!(matches!(err, ToolError::ArgumentValidation { .. }));
    }

    #[tokio::test]
    async fn handler_failure_is_wrapped() {
        let err = registry()
            .dispatch("call_1", "broken", "{}", &ToolEnv::default())
            .await
            .unwrap_err();
        match &err {
            ToolError::Execution { tool_name, source } => {
                assert_eq!(tool_name, "broken");
                assert_eq!(source.to_string(), "disk on fire");
            }
            other => panic!("Expected Execution, got {other:?}"),
        }
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn structured_output_is_serialized() {
        let env = ToolEnv::new("what time is it?", None);
        let result = registry().dispatch("c", "probe", "", &env).await.unwrap();
        assert_eq!(result.data["user_input"], "what time is it?");
        assert_eq!(result.data["has_context"], false);
        assert!(result.content.starts_with('{'));
        assert!(result.content.contains("what time is it?"));
    }
}
