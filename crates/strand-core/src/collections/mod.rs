//! Non-empty collections for compile-time guarantees.
//!
//! A think decision that asks for action always carries at least one tool
//! call; `NonEmptyVec` makes the empty "act on nothing" state unrepresentable.

pub mod non_empty_vec;

pub use non_empty_vec::{EmptyVecError, NonEmptyVec};
