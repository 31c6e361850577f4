//! The agent execution loop for toolloop.
//!
//! A run follows a **call model → dispatch tools → call model** cycle:
//!
//! 1. **Append** the caller's input to the message store
//! 2. **Call the model** with the full stored history and the tool descriptors
//! 3. **Record** the model's message before acting on it
//! 4. **If tool calls**: dispatch each one, record its result, loop back to step 2
//! 5. **If content**: return it along with the final history
//!
//! The loop stops on a final answer, an empty reply, an exhausted turn
//! budget, or an external cancellation signal.

pub mod loop_runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{AgentLoop, DEFAULT_MAX_TURNS, RunInput, RunOutcome};
