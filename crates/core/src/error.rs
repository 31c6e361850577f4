//! Error types for the toolloop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator (store, gateway, tools, flows) has its own error enum;
//! the top-level [`Error`] wraps them and adds the normalized run failure.

use crate::agent::LoopState;
use thiserror::Error;

/// Boxed error produced by tool and task handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The top-level error type for all toolloop operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Message store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Model gateway errors ---
    #[error("Model error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Flow / task errors ---
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    /// A whole agent run failed. Wraps the original cause.
    ///
    /// A failure in `AwaitingTool` leaves the assistant's tool-call message in
    /// the store without matching tool results. Callers resuming on that store
    /// must repair or drop it first; chat-completions APIs reject such history.
    #[error("Agent run failed in state {state} (turn {turn}): {source}")]
    Run {
        state: LoopState,
        turn: u32,
        #[source]
        source: Box<Error>,
    },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a failure into the normalized run error.
    pub fn run_failed(state: LoopState, turn: u32, source: impl Into<Error>) -> Self {
        Error::Run {
            state,
            turn,
            source: Box::new(source.into()),
        }
    }

    /// The innermost non-run error, useful when matching on the original cause.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Run { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to append to store '{store}': {reason}")]
    Append { store: String, reason: String },

    #[error("Failed to read from store '{store}': {reason}")]
    Read { store: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Could not parse arguments for {tool_name}: {reason}")]
    ArgumentParse { tool_name: String, reason: String },

    #[error("Invalid arguments for {tool_name}: {}", .violations.join("; "))]
    ArgumentValidation {
        tool_name: String,
        violations: Vec<String>,
    },

    #[error("Tool execution failed: {tool_name}: {source}")]
    Execution {
        tool_name: String,
        #[source]
        source: BoxError,
    },
}

impl ToolError {
    /// Whether the model should see this failure as a tool result.
    ///
    /// Unknown tools are fatal to the run; everything else is recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ToolError::NotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Flow not found: {0}")]
    FlowNotFound(String),

    #[error("Task not found: {task} in flow {flow}")]
    TaskNotFound { flow: String, task: String },

    #[error("Task {flow}:{task} failed: {source}")]
    TaskFailed {
        flow: String,
        task: String,
        #[source]
        source: Box<Error>,
    },
}
