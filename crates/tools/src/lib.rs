//! Built-in tool implementations for toolloop.
//!
//! Tools give the agent small, safe capabilities: reading the clock and
//! keeping notes in the run's scratch memory.

pub mod current_time;
pub mod scratch_note;

use toolloop_core::tool::ToolRegistry;

pub use current_time::CurrentTimeTool;
pub use scratch_note::ScratchNoteTool;

/// Create a default tool registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CurrentTimeTool));
    registry.register(Box::new(ScratchNoteTool));
    registry
}
