//! json-observer-util - value model and utilities for json-observer
//!
//! This crate provides the [`Node`] value graph observed by the engine, plus
//! deep cloning and deep equality over it.

pub mod json_clone;
pub mod json_equal;
pub mod node;

// Re-exports for convenience
pub use json_clone::deep_clone;
pub use json_equal::deep_equal;
pub use node::{Accessor, Node, Object};
