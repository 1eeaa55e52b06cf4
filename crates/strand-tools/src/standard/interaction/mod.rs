//! # Human Interaction Tools
//!
//! Each tool asks a question through a [`HumanChannel`]. Validated prompts
//! (choice, confirmation, number, email) re-ask up to `max_retries` times,
//! telling the person what was wrong in between, and then fail with
//! [`FailureReason::InvalidInput`](strand_core::FailureReason::InvalidInput).
//! The engine only ever sees the final outcome.

mod channel;
mod tools;

pub use channel::{ConsoleChannel, HumanChannel, ScriptedChannel};
pub use tools::{
    AskChoiceTool, AskConfirmationTool, AskEmailTool, AskNumberTool, AskQuestionTool,
    DEFAULT_MAX_RETRIES, interaction_tools, interaction_tools_with_retries,
};
