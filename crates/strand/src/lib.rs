//! # Strand
//!
//! Strand drives a language-model agent toward a goal through a bounded
//! think/act loop. Each step the model decides whether to act; if it does,
//! the requested tools run and their observations join the history the
//! model sees next. A run stops when the model needs no further action,
//! when it invokes the reserved `terminate` tool, when a fatal condition
//! occurs, or when the step budget is exhausted.
//!
//! ## Core Components
//!
//! - **[Engine]**: shared model and tools; mints a fresh [`Run`] per request
//! - **[Run]**: the per-execution state machine, consumed by
//!   [`Run::execute`] or [`Run::stream`]
//! - **[Tool]** and **[ToolRegistry]**: capabilities offered to the model
//! - **[ModelCollaborator]**: the model behind the think phase
//! - **[RunStream]**: incremental [`RunEvent`]s with timeout and cancellation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strand::{Engine, EngineError, ModelCollaborator, RunConfig, RunEvent};
//!
//! # async fn demo(model: Arc<dyn ModelCollaborator>) -> Result<(), EngineError> {
//! let engine = Engine::builder()
//!     .config(RunConfig::builder().step_budget(10).build()?)
//!     .model(model)
//!     .build()
//!     .await?;
//!
//! let mut stream = engine.stream("Plan a weekend trip")?;
//! while let Some(event) = stream.recv().await {
//!     match event {
//!         RunEvent::Partial(delta) => print!("{delta}"),
//!         RunEvent::Completed(text) => println!("\n{text}"),
//!         RunEvent::Error(message) => eprintln!("\nrun failed: {message}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use strand_core as core;
pub use strand_engine as engine;
pub use strand_tools as tools;

#[cfg(feature = "observability")]
pub use strand_observability as observability;

#[cfg(feature = "testing")]
pub use strand_testing as testing;

// ============================================================================
// Run lifecycle and engine
// ============================================================================

pub use strand_engine::{
    ActReport, CancelHandle, Engine, EngineBuilder, FinalResult, LoggingModel, Run, RunBuilder,
    RunStream, TerminationDetector, ThinkAct, ThinkContext, ToolCallingAgent,
};

pub use strand_core::{RunState, TERMINATE_TOOL};

// ============================================================================
// Messages, models and events
// ============================================================================

pub use strand_core::{
    DeltaSink, DispatchStatus, Message, ModelCollaborator, Role, RunEvent, ThinkDecision,
    ThinkRequest, ToolCall, ToolCallResult,
};

// ============================================================================
// Configuration and errors
// ============================================================================

pub use strand_core::{
    ChannelError, ConfigError, EngineError, FailureKind, ModelError, ProviderError,
    RegistryError, RunConfig, RunConfigBuilder, RunFailure, StateError,
};

// ============================================================================
// Tools
// ============================================================================

pub use strand_core::{ExecutionResult, FailureReason, Tool, ToolDescriptor};

pub use strand_tools::{
    DEFAULT_DISCOVERY_TIMEOUT, Observation, RemoteToolProvider, ToolDispatcher, ToolRegistry,
    merge_remote_tools,
};

// Human interaction
pub use strand_tools::{
    AskChoiceTool, AskConfirmationTool, AskEmailTool, AskNumberTool, AskQuestionTool,
    ConsoleChannel, HumanChannel, ScriptedChannel, interaction_tools,
};

// ============================================================================
// Collections
// ============================================================================

pub use strand_core::{EmptyVecError, NonEmptyVec};

#[cfg(feature = "observability")]
pub use strand_observability::{LogFormat, LoggingConfig, ObservabilityError, init_tracing};
