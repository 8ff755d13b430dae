//! Value equality for observed value graphs.

mod deep_equal;

pub use deep_equal::deep_equal;
