//! Agent loop states and terminal conditions.

use serde::{Deserialize, Serialize};

/// The execution loop's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Appending the caller's input
    Starting,
    /// Waiting for the next model message
    AwaitingModel,
    /// Dispatching the pending tool calls of the last model message
    AwaitingTool,
    /// Terminal: the run produced an outcome
    Done,
    /// Terminal: the run raised an error
    Failed,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done | LoopState::Failed)
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LoopState::Starting => "starting",
            LoopState::AwaitingModel => "awaiting_model",
            LoopState::AwaitingTool => "awaiting_tool",
            LoopState::Done => "done",
            LoopState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Why a run reached `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model returned final content
    FinalAnswer,
    /// The model returned neither content nor tool calls
    NaturalStop,
    /// The turn budget ran out before a final answer
    TurnBudgetExceeded,
    /// An external cancellation signal was observed
    Cancelled,
}

/// What the loop does when one model message requests several tool calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiToolCallPolicy {
    /// Dispatch every call in order, one tool-result message each (default)
    #[default]
    Sequential,
    /// Fail the run with an invalid-response error
    Reject,
}
