//! # Strand Testing Utilities
//!
//! Deterministic stand-ins for the collaborators a run talks to, plus
//! assertions over its outcome.
//!
//! ## Components
//!
//! - **Scripted Model**: replays a fixed sequence of think decisions
//! - **Mock Tools**: predictable tool implementations with call tracking
//! - **Assertions**: fluent checks on [`FinalResult`] and event streams
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use strand_engine::Engine;
//! use strand_testing::{MockTool, RunAssertions, ScriptedModel};
//!
//! # tokio_test::block_on(async {
//! let search = MockTool::new("search").with_default_response("3 results");
//! let model = ScriptedModel::new()
//!     .then_call("search", serde_json::json!({"q": "rust"}))
//!     .then_finish("found it");
//!
//! let engine = Engine::builder()
//!     .model(Arc::new(model))
//!     .tool(Arc::new(search.clone()))
//!     .build()
//!     .await
//!     .unwrap();
//!
//! let result = engine.execute("look something up").await.unwrap();
//! result.assert_finished().assert_steps(2);
//! assert_eq!(search.call_count(), 1);
//! # });
//! ```
//!
//! [`FinalResult`]: strand_engine::FinalResult

/// Fluent assertions on run outcomes
pub mod assertions;
/// Mock tools for predictable testing
pub mod mock_tools;
/// Scripted model collaborator
pub mod scripted_model;

pub use assertions::{EventAssertions, RunAssertions, collect_events};
pub use mock_tools::MockTool;
pub use scripted_model::{RecordedRequest, ScriptedModel};

use std::sync::{Mutex, MutexGuard};

/// Lock that survives a panicking test thread.
pub(crate) fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
