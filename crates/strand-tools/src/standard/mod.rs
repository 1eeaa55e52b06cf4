//! # Standard Tool Library
//!
//! Tools that ship with the engine. Currently the human-in-the-loop family,
//! which asks a person for input over an injected [`HumanChannel`].
//!
//! ```rust
//! use std::sync::Arc;
//! use strand_tools::{ScriptedChannel, ToolRegistry, interaction_tools};
//!
//! let channel = Arc::new(ScriptedChannel::new(["yes"]));
//! let mut registry = ToolRegistry::new();
//! for tool in interaction_tools(channel) {
//!     registry.register(tool).unwrap();
//! }
//! assert!(registry.contains("ask_confirmation"));
//! ```

/// Human-in-the-loop interaction tools
pub mod interaction;

pub use interaction::{
    AskChoiceTool, AskConfirmationTool, AskEmailTool, AskNumberTool, AskQuestionTool,
    ConsoleChannel, DEFAULT_MAX_RETRIES, HumanChannel, ScriptedChannel, interaction_tools,
    interaction_tools_with_retries,
};
