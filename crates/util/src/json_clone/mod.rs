//! Deep cloning of observed value graphs.
//!
//! Used to hand out snapshots of an observed target that can be mutated
//! freely without affecting the live graph.

mod clone;

pub use clone::deep_clone;
