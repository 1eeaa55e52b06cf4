//! # Strand Engine
//!
//! Drives a run from its goal to exactly one terminal state.
//!
//! ## Components
//!
//! - **Run** (`run`): per-execution state machine and the bounded
//!   think/act loop
//! - **ThinkAct** (`think_act`): the two-operation capability a run is
//!   parameterized by, with [`ToolCallingAgent`] as the default
//! - **Termination** (`termination`): the reserved stop capability
//! - **Streaming** (`streaming`): incremental events with timeout and
//!   subscriber-driven cancellation
//! - **Engine** (`engine`): shared model and tools, a fresh run per request
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strand_engine::{Engine, ModelCollaborator, RunConfig};
//!
//! # async fn demo(model: Arc<dyn ModelCollaborator>) -> Result<(), strand_engine::EngineError> {
//! let engine = Engine::builder()
//!     .config(RunConfig::builder().name("researcher").step_budget(10).build()?)
//!     .model(model)
//!     .build()
//!     .await?;
//!
//! let result = engine.execute("Summarize today's weather").await?;
//! println!("{}", result.text());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod engine;
pub mod logging;
pub mod run;
pub mod streaming;
pub mod termination;
pub mod think_act;

pub use cancel::CancelHandle;
pub use engine::{Engine, EngineBuilder};
pub use logging::LoggingModel;
pub use run::{FinalResult, Run, RunBuilder};
pub use streaming::RunStream;
pub use termination::TerminationDetector;
pub use think_act::{ActReport, ThinkAct, ThinkContext, ToolCallingAgent};

pub use strand_core::{
    EngineError, FailureKind, ModelCollaborator, ModelError, RunConfig, RunEvent, RunFailure,
    RunState,
};
