//! # Strand Core
//!
//! Core traits and types for the Strand think/act execution engine.
//! This crate provides the vocabulary shared by every other Strand crate:
//! run lifecycle states, conversation history, tool and model contracts,
//! streaming events and run configuration.

pub mod collections;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod state;
pub mod tool;

pub use collections::{EmptyVecError, NonEmptyVec};
pub use config::{
    DEFAULT_STEP_BUDGET, DEFAULT_STREAM_TIMEOUT, RunConfig, RunConfigBuilder,
};
pub use error::{
    ChannelError, ConfigError, ConfigResult, EngineError, EngineResult, FailureKind, ModelError,
    ModelResult, ProviderError, RegistryError, RunFailure, StateError,
};
pub use event::{DeltaSink, RunEvent};
pub use message::{DispatchStatus, Message, Role, ToolCall, ToolCallResult};
pub use model::{ModelCollaborator, ThinkDecision, ThinkRequest};
pub use state::RunState;
pub use tool::{ExecutionResult, FailureReason, Tool, ToolDescriptor};

/// Reserved name of the termination capability.
///
/// It is offered to the model on every think call and can never be
/// registered as an ordinary tool.
pub const TERMINATE_TOOL: &str = "terminate";
