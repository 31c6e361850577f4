//! The agent execution loop implementation.

use tokio_util::sync::CancellationToken;
use toolloop_config::AppConfig;
use toolloop_core::agent::{LoopState, MultiToolCallPolicy, StopReason};
use toolloop_core::error::{Error, GatewayError, Result};
use toolloop_core::gateway::GatewayRequest;
use toolloop_core::message::{Message, MessageToolCall, Role};
use toolloop_core::store::MessageStore;
use toolloop_core::tool::ToolEnv;
use toolloop_core::ExecutionContext;
use tracing::{debug, info, warn};

/// Default number of model calls a run may make.
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// What the caller hands to [`AgentLoop::run`].
#[derive(Debug, Clone)]
pub enum RunInput {
    /// A single new user message
    Text(String),
    /// The full conversation as the caller sees it; only the messages
    /// beyond what the store already holds are appended
    Messages(Vec<Message>),
}

impl From<&str> for RunInput {
    fn from(text: &str) -> Self {
        RunInput::Text(text.to_string())
    }
}

impl From<String> for RunInput {
    fn from(text: String) -> Self {
        RunInput::Text(text)
    }
}

impl From<Vec<Message>> for RunInput {
    fn from(messages: Vec<Message>) -> Self {
        RunInput::Messages(messages)
    }
}

/// The terminal result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final assistant content, if the run ended on one
    pub content: Option<String>,

    /// The full stored history at the end of the run
    pub history: Vec<Message>,

    /// Model calls made
    pub turns: u32,

    pub stop_reason: StopReason,
}

/// The core agent loop that orchestrates model calls and tool dispatch.
///
/// Every transition is persisted to the context's message store before the
/// next step runs, so the log always shows how far a run got.
pub struct AgentLoop {
    name: String,
    description: String,
    context: ExecutionContext,
    max_turns: u32,
    multi_tool_calls: MultiToolCallPolicy,
    cancel: Option<CancellationToken>,
}

impl AgentLoop {
    /// Create a new agent loop over an execution context.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            context,
            max_turns: DEFAULT_MAX_TURNS,
            multi_tool_calls: MultiToolCallPolicy::default(),
            cancel: None,
        }
    }

    /// Build a loop from the `[agent]` section of the configuration.
    ///
    /// The configured system prompt applies only when the context has no
    /// task prompt of its own.
    pub fn from_config(context: ExecutionContext, config: &AppConfig) -> Self {
        let task_prompt = context
            .task_prompt()
            .map(str::to_owned)
            .or_else(|| config.system_prompt.clone());
        let context = context
            .with_debug(config.agent.debug)
            .with_task_prompt(task_prompt);

        Self::new("toolloop", "General-purpose tool-using assistant", context)
            .with_max_turns(config.agent.max_turns)
            .with_multi_tool_calls(config.agent.multi_tool_calls)
    }

    /// Set the maximum number of model calls per run (at least one).
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max.max(1);
        self
    }

    pub fn with_multi_tool_calls(mut self, policy: MultiToolCallPolicy) -> Self {
        self.multi_tool_calls = policy;
        self
    }

    /// Observe an external cancellation signal between turns.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Run to completion and return only the final content (empty if none).
    pub async fn run_text(&self, input: impl Into<RunInput>) -> Result<String> {
        Ok(self.run(input).await?.content.unwrap_or_default())
    }

    /// Drive one run: append the input, then alternate model calls and tool
    /// dispatch until the model answers, stops, the budget runs out, or the
    /// run is cancelled.
    ///
    /// Any store, model or unresolvable-tool failure ends the run with a
    /// single [`Error::Run`] carrying the state and turn it happened in.
    pub async fn run(&self, input: impl Into<RunInput>) -> Result<RunOutcome> {
        let ctx = &self.context;
        let store = ctx.store();

        info!(agent = %self.name, store = %store.name(), max_turns = self.max_turns, "Starting run");
        ctx.log(format!("[{}] starting", self.name));

        let (delta, user_input) = Self::prepare_input(store.as_ref(), input.into())
            .await
            .map_err(|e| Error::run_failed(LoopState::Starting, 0, e))?;

        if !delta.is_empty() {
            debug!(agent = %self.name, count = delta.len(), "Appending caller input");
            store
                .append(delta)
                .await
                .map_err(|e| Error::run_failed(LoopState::Starting, 0, e))?;
        }

        let tools = ctx.tools().describe_all();
        let system_prompt = ctx.task_prompt().map(str::to_owned);
        let mut turns: u32 = 0;

        loop {
            if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
                info!(agent = %self.name, turns, "Run cancelled");
                ctx.log(format!("[{}] cancelled after {turns} turns", self.name));
                return self.finish(StopReason::Cancelled, None, turns).await;
            }

            if turns >= self.max_turns {
                warn!(agent = %self.name, turns, "Turn budget exhausted");
                ctx.log(format!("[{}] turn budget of {} reached", self.name, self.max_turns));
                return self.finish(StopReason::TurnBudgetExceeded, None, turns).await;
            }

            turns += 1;
            ctx.log(format!("[{}] turn {turns}: awaiting model", self.name));

            let history = store
                .read_all()
                .await
                .map_err(|e| Error::run_failed(LoopState::AwaitingModel, turns, e))?;

            debug!(agent = %self.name, turn = turns, history = history.len(), "Calling model");

            let request = GatewayRequest::new(history, tools.clone())
                .with_system_prompt(system_prompt.clone());
            let response = ctx
                .gateway()
                .complete(request)
                .await
                .map_err(|e| Error::run_failed(LoopState::AwaitingModel, turns, e))?;

            let message = response.message;
            if message.role != Role::Assistant {
                return Err(Error::run_failed(
                    LoopState::AwaitingModel,
                    turns,
                    GatewayError::InvalidResponse(format!(
                        "expected an assistant message, got role '{}'",
                        message.role
                    )),
                ));
            }

            let pending = message.tool_calls.clone();
            let content = message.has_content().then(|| message.content.clone());

            // Recorded before any dispatch so a tool-call request is never lost.
            store
                .append(vec![message])
                .await
                .map_err(|e| Error::run_failed(LoopState::AwaitingModel, turns, e))?;

            if pending.is_empty() {
                return match content {
                    Some(text) => {
                        info!(agent = %self.name, turns, "Run finished with final answer");
                        ctx.log(format!("[{}] final answer after {turns} turns", self.name));
                        self.finish(StopReason::FinalAnswer, Some(text), turns).await
                    }
                    None => {
                        info!(agent = %self.name, turns, "Model stopped without content");
                        ctx.log(format!("[{}] natural stop", self.name));
                        self.finish(StopReason::NaturalStop, None, turns).await
                    }
                };
            }

            ctx.log(format!(
                "[{}] turn {turns}: awaiting {} tool call(s)",
                self.name,
                pending.len()
            ));
            self.dispatch_pending(&pending, &user_input, turns).await?;
        }
    }

    /// Dispatch every pending call in order, appending one tool message each.
    async fn dispatch_pending(
        &self,
        pending: &[MessageToolCall],
        user_input: &str,
        turn: u32,
    ) -> Result<()> {
        let ctx = &self.context;

        if pending.len() > 1 && self.multi_tool_calls == MultiToolCallPolicy::Reject {
            return Err(Error::run_failed(
                LoopState::AwaitingTool,
                turn,
                GatewayError::InvalidResponse(format!(
                    "model requested {} tool calls in one message; only one is allowed",
                    pending.len()
                )),
            ));
        }

        let env = ToolEnv::new(user_input, Some(ctx));

        for call in pending {
            debug!(agent = %self.name, turn, tool = %call.name, call_id = %call.id, "Dispatching tool call");

            let content = match ctx.tools().dispatch_call(call, &env).await {
                Ok(result) => result.content,
                Err(e) if !e.is_recoverable() => {
                    warn!(agent = %self.name, tool = %call.name, "Model called an unknown tool");
                    return Err(Error::run_failed(LoopState::AwaitingTool, turn, e));
                }
                Err(e) => {
                    warn!(agent = %self.name, tool = %call.name, error = %e, "Tool call failed");
                    format!("Error: {e}")
                }
            };

            ctx.store()
                .append(vec![Message::tool_result(&call.id, content)])
                .await
                .map_err(|e| Error::run_failed(LoopState::AwaitingTool, turn, e))?;
        }

        Ok(())
    }

    /// Work out which messages to append and the user text tools will see.
    async fn prepare_input(
        store: &dyn MessageStore,
        input: RunInput,
    ) -> Result<(Vec<Message>, String)> {
        match input {
            RunInput::Text(text) => Ok((vec![Message::user(text.clone())], text)),
            RunInput::Messages(mut messages) => {
                let stored = store.len().await?;
                let delta = if messages.len() > stored {
                    messages.split_off(stored)
                } else {
                    Vec::new()
                };
                let user_input = messages
                    .iter()
                    .chain(delta.iter())
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Ok((delta, user_input))
            }
        }
    }

    async fn finish(
        &self,
        stop_reason: StopReason,
        content: Option<String>,
        turns: u32,
    ) -> Result<RunOutcome> {
        let history = self
            .context
            .store()
            .read_all()
            .await
            .map_err(|e| Error::run_failed(LoopState::Done, turns, e))?;

        Ok(RunOutcome {
            content,
            history,
            turns,
            stop_reason,
        })
    }
}

impl std::fmt::Debug for AgentLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentLoop")
            .field("name", &self.name)
            .field("max_turns", &self.max_turns)
            .field("multi_tool_calls", &self.multi_tool_calls)
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::sync::Arc;
    use toolloop_core::error::{BoxError, StoreError, ToolError};
    use toolloop_core::tool::{Tool, ToolEnv, ToolRegistry};
    use toolloop_core::ExecutionContext;
    use toolloop_memory::{InMemoryScratch, InMemoryStore};

    fn tool_call(id: &str, name: &str, args: &str) -> MessageToolCall {
        MessageToolCall::new(id, name, args)
    }

    #[tokio::test]
    async fn immediate_answer_takes_one_model_call() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("Hello!")]));
        let (ctx, store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("Hi").await.unwrap();

        assert_eq!(gateway.call_count(), 1);
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.stop_reason, StopReason::FinalAnswer);
        assert_eq!(outcome.content.as_deref(), Some("Hello!"));
        assert_eq!(outcome.history, vec![Message::user("Hi"), Message::assistant("Hello!")]);
        assert_eq!(store.read_all().await.unwrap(), outcome.history);
    }

    #[tokio::test]
    async fn tool_call_then_answer() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_response(vec![tool_call("c1", "echo", r#"{"text":"ping"}"#)]),
            text_response("The tool said ping."),
        ]));
        let (ctx, _store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("Use the echo tool").await.unwrap();

        assert_eq!(gateway.call_count(), 2);
        assert_eq!(
            outcome.history,
            vec![
                Message::user("Use the echo tool"),
                Message::assistant_tool_calls(vec![tool_call("c1", "echo", r#"{"text":"ping"}"#)]),
                Message::tool_result("c1", "ping"),
                Message::assistant("The tool said ping."),
            ]
        );
        // Second model call saw the tool result.
        let requests = gateway.requests();
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[1].tools.len(), 3);
    }

    #[tokio::test]
    async fn looping_model_stops_at_turn_budget() {
        let gateway = Arc::new(ScriptedGateway::repeating(tool_response(vec![tool_call(
            "c",
            "echo",
            r#"{"text":"again"}"#,
        )])));
        let (ctx, _store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("loop forever").await.unwrap();

        assert_eq!(gateway.call_count(), 10);
        assert_eq!(outcome.turns, 10);
        assert_eq!(outcome.stop_reason, StopReason::TurnBudgetExceeded);
        assert!(outcome.content.is_none());
        // user + 10 × (assistant tool call + tool result)
        assert_eq!(outcome.history.len(), 21);
    }

    #[tokio::test]
    async fn custom_turn_budget() {
        let gateway = Arc::new(ScriptedGateway::repeating(tool_response(vec![tool_call(
            "c",
            "echo",
            r#"{"text":"x"}"#,
        )])));
        let (ctx, _store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx).with_max_turns(3);

        let outcome = agent.run("go").await.unwrap();
        assert_eq!(gateway.call_count(), 3);
        assert_eq!(outcome.stop_reason, StopReason::TurnBudgetExceeded);
    }

    #[tokio::test]
    async fn unknown_tool_fails_without_tool_result() {
        let gateway = Arc::new(ScriptedGateway::new(vec![tool_response(vec![tool_call(
            "c1",
            "teleport",
            "{}",
        )])]));
        let (ctx, store) = context_with(gateway);
        let agent = AgentLoop::new("test", "test agent", ctx);

        let err = agent.run("beam me up").await.unwrap_err();

        assert!(matches!(
            err,
            Error::Run { state: LoopState::AwaitingTool, turn: 1, .. }
        ));
        assert!(matches!(err.root_cause(), Error::Tool(ToolError::NotFound(name)) if name == "teleport"));

        let history = store.read_all().await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.role != Role::Tool));
    }

    #[tokio::test]
    async fn tool_errors_are_recorded_for_the_model() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_response(vec![tool_call("c1", "broken", "{}")]),
            tool_response(vec![tool_call("c2", "echo", "{not json")]),
            tool_response(vec![tool_call("c3", "echo", r#"{"text": 7}"#)]),
            text_response("Giving up."),
        ]));
        let (ctx, _store) = context_with(gateway);
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("try things").await.unwrap();
        assert_eq!(outcome.stop_reason, StopReason::FinalAnswer);

        let tool_messages: Vec<&Message> =
            outcome.history.iter().filter(|m| m.role == Role::Tool).collect();
        assert_eq!(tool_messages.len(), 3);
        assert!(tool_messages[0].content.starts_with("Error: "));
        assert!(tool_messages[0].content.contains("disk on fire"));
        assert!(tool_messages[1].content.contains("Could not parse arguments"));
        assert!(tool_messages[2].content.contains("Invalid arguments"));
        assert_eq!(tool_messages[2].tool_call_id.as_deref(), Some("c3"));
    }

    #[tokio::test]
    async fn multiple_calls_are_dispatched_in_order() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_response(vec![
                tool_call("a", "echo", r#"{"text":"first"}"#),
                tool_call("b", "echo", r#"{"text":"second"}"#),
            ]),
            text_response("done"),
        ]));
        let (ctx, _store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("two things").await.unwrap();

        assert_eq!(gateway.call_count(), 2);
        assert_eq!(outcome.history[2], Message::tool_result("a", "first"));
        assert_eq!(outcome.history[3], Message::tool_result("b", "second"));
        assert_eq!(outcome.history.len(), 5);
    }

    #[tokio::test]
    async fn reject_policy_fails_multi_call_turns() {
        let gateway = Arc::new(ScriptedGateway::new(vec![tool_response(vec![
            tool_call("a", "echo", r#"{"text":"1"}"#),
            tool_call("b", "echo", r#"{"text":"2"}"#),
        ])]));
        let (ctx, store) = context_with(gateway);
        let agent = AgentLoop::new("test", "test agent", ctx)
            .with_multi_tool_calls(MultiToolCallPolicy::Reject);

        let err = agent.run("two things").await.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::Gateway(GatewayError::InvalidResponse(_))
        ));
        // The request itself is still on record.
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn tools_receive_user_input_and_context() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_response(vec![tool_call("c1", "whoami", "")]),
            text_response("ok"),
        ]));
        let (ctx, _store) = context_with(gateway);
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("original question").await.unwrap();
        assert_eq!(
            outcome.history[2],
            Message::tool_result("c1", "original question|context")
        );
    }

    #[tokio::test]
    async fn content_alongside_tool_calls_still_dispatches() {
        let mut thinking = Message::assistant_tool_calls(vec![tool_call("c1", "echo", r#"{"text":"x"}"#)]);
        thinking.content = "Let me check.".into();
        let gateway = Arc::new(ScriptedGateway::new(vec![
            response(thinking),
            text_response("Checked."),
        ]));
        let (ctx, _store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("check").await.unwrap();
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(outcome.content.as_deref(), Some("Checked."));
    }

    #[tokio::test]
    async fn empty_message_is_a_natural_stop() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            text_response("   "),
            text_response(""),
        ]));
        let (ctx, _store) = context_with(gateway);
        let agent = AgentLoop::new("test", "test agent", ctx);

        let outcome = agent.run("hello?").await.unwrap();
        assert_eq!(outcome.stop_reason, StopReason::NaturalStop);
        assert!(outcome.content.is_none());
        assert_eq!(outcome.history.len(), 2);
        assert_eq!(agent.run_text("again?").await.unwrap(), "");
    }

    #[tokio::test]
    async fn message_batch_appends_only_the_delta() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("Paris.")]));
        let (ctx, store) = context_with(gateway);
        store
            .append(vec![Message::user("Hi"), Message::assistant("Hello!")])
            .await
            .unwrap();
        let agent = AgentLoop::new("test", "test agent", ctx);

        let batch = vec![
            Message::user("Hi"),
            Message::assistant("Hello!"),
            Message::user("Capital of France?"),
        ];
        let outcome = agent.run(batch).await.unwrap();

        assert_eq!(
            outcome.history,
            vec![
                Message::user("Hi"),
                Message::assistant("Hello!"),
                Message::user("Capital of France?"),
                Message::assistant("Paris."),
            ]
        );
    }

    #[tokio::test]
    async fn gateway_failure_keeps_the_user_turn() {
        let gateway = Arc::new(ScriptedGateway::failing(GatewayError::Unavailable(
            "connection refused".into(),
        )));
        let (ctx, store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx);

        let err = agent.run("anyone there?").await.unwrap_err();

        assert_eq!(gateway.call_count(), 1);
        assert!(matches!(
            err,
            Error::Run { state: LoopState::AwaitingModel, turn: 1, .. }
        ));
        assert!(matches!(err.root_cause(), Error::Gateway(GatewayError::Unavailable(_))));
        assert_eq!(store.read_all().await.unwrap(), vec![Message::user("anyone there?")]);
    }

    #[tokio::test]
    async fn non_assistant_reply_is_rejected() {
        let gateway = Arc::new(ScriptedGateway::new(vec![response(Message::user("impostor"))]));
        let (ctx, store) = context_with(gateway);
        let agent = AgentLoop::new("test", "test agent", ctx);

        let err = agent.run("hi").await.unwrap_err();
        assert!(matches!(err.root_cause(), Error::Gateway(GatewayError::InvalidResponse(_))));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_normalized() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("unused")]));
        let ctx = context_with_store(gateway.clone(), Arc::new(FailingStore));
        let agent = AgentLoop::new("test", "test agent", ctx);

        let err = agent.run("hi").await.unwrap_err();
        assert!(matches!(err, Error::Run { state: LoopState::Starting, .. }));
        assert!(matches!(err.root_cause(), Error::Store(StoreError::Append { .. })));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_is_checked_before_each_model_call() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("unused")]));
        let (ctx, store) = context_with(gateway.clone());
        let token = CancellationToken::new();
        token.cancel();
        let agent = AgentLoop::new("test", "test agent", ctx).with_cancellation(token);

        let outcome = agent.run("hi").await.unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.turns, 0);
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(store.read_all().await.unwrap(), vec![Message::user("hi")]);
    }

    /// Cancels the run's token when called.
    struct StopTool(CancellationToken);

    #[async_trait::async_trait]
    impl Tool for StopTool {
        fn name(&self) -> &str {
            "stop"
        }
        fn description(&self) -> &str {
            "Cancels the current run"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object" })
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
            _env: &ToolEnv<'_>,
        ) -> std::result::Result<serde_json::Value, BoxError> {
            self.0.cancel();
            Ok(serde_json::json!("stopping"))
        }
    }

    #[tokio::test]
    async fn cancellation_between_turns_stops_before_next_model_call() {
        let token = CancellationToken::new();
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_response(vec![tool_call("c1", "stop", "{}")]),
            text_response("never sent"),
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(StopTool(token.clone())));
        let store = InMemoryStore::new();
        let ctx = ExecutionContext::new(
            gateway.clone(),
            Arc::new(store.clone()),
            Arc::new(registry),
            Arc::new(InMemoryScratch::new()),
        );
        let agent = AgentLoop::new("test", "test agent", ctx).with_cancellation(token);

        let outcome = agent.run("hi").await.unwrap();

        assert_eq!(gateway.call_count(), 1);
        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.content, None);
        assert_eq!(
            store.read_all().await.unwrap(),
            vec![
                Message::user("hi"),
                Message::assistant_tool_calls(vec![tool_call("c1", "stop", "{}")]),
                Message::tool_result("c1", "stopping"),
            ]
        );
    }

    #[tokio::test]
    async fn task_prompt_travels_as_system_prompt() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("Bonjour")]));
        let (ctx, store) = context_with(gateway.clone());
        let agent = AgentLoop::new("test", "test agent", ctx.scoped(Some("Answer in French.".into())));

        agent.run("Hello").await.unwrap();

        let requests = gateway.requests();
        assert_eq!(requests[0].system_prompt.as_deref(), Some("Answer in French."));
        // Never persisted.
        assert!(store
            .read_all()
            .await
            .unwrap()
            .iter()
            .all(|m| m.role != Role::System));
    }

    #[tokio::test]
    async fn from_config_applies_agent_settings() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text_response("ok")]));
        let (ctx, _store) = context_with(gateway.clone());
        let mut config = AppConfig::default();
        config.agent.max_turns = 4;
        config.agent.debug = true;
        config.system_prompt = Some("Be brief.".into());

        let agent = AgentLoop::from_config(ctx, &config);
        assert_eq!(agent.max_turns(), 4);
        assert!(agent.context().is_debug());

        agent.run("hi").await.unwrap();
        assert_eq!(gateway.requests()[0].system_prompt.as_deref(), Some("Be brief."));
    }
}
