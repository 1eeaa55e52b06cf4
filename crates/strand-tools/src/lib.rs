//! # Strand Tools
//!
//! Everything between a model's tool request and a tool's result:
//!
//! - **Registry** (`registry`): the tool set of a run, with unique names and
//!   the termination name reserved
//! - **Dispatcher** (`dispatcher`): name resolution plus failure containment,
//!   producing one observation per call
//! - **Remote providers** (`provider`): optional network-backed tool sources
//!   merged into a registry with local fallback
//! - **Standard tools** (`standard`): human-in-the-loop interaction tools

pub mod dispatcher;
pub mod provider;
pub mod registry;
pub mod standard;

pub use dispatcher::{Observation, ToolDispatcher};
pub use provider::{DEFAULT_DISCOVERY_TIMEOUT, RemoteToolProvider, merge_remote_tools};
pub use registry::ToolRegistry;
pub use standard::*;
pub use strand_core::{DispatchStatus, ExecutionResult, FailureReason, Tool, ToolDescriptor};
