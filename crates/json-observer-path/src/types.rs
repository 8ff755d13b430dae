//! Type definitions for key paths.

use std::fmt;

/// The reserved listener path that matches every mutation.
pub const WILDCARD: &str = "*";

/// A single step in a parsed key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Object member access (`a.b`, `a[b]`).
    ///
    /// A key made only of digits is applied as an index when the container
    /// turns out to be an array (`list.0`).
    Key(String),
    /// Concrete array index (`arr[2]`).
    Index(usize),
    /// Member read through invocation, written `name()` or `(name)`.
    Call(String),
    /// Generic array index (`arr[]`), only meaningful in listener paths.
    Any,
}

impl PathStep {
    /// Returns the numeric index this step addresses, if any.
    ///
    /// # Example
    ///
    /// ```
    /// use json_observer_path::PathStep;
    ///
    /// assert_eq!(PathStep::Index(3).as_index(), Some(3));
    /// assert_eq!(PathStep::Key("7".into()).as_index(), Some(7));
    /// assert_eq!(PathStep::Key("name".into()).as_index(), None);
    /// ```
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(i) => Some(*i),
            PathStep::Key(k) => k.parse().ok(),
            _ => None,
        }
    }

    pub fn is_bracketed(&self) -> bool {
        matches!(self, PathStep::Index(_) | PathStep::Any)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(k) => f.write_str(k),
            PathStep::Index(i) => write!(f, "[{i}]"),
            PathStep::Call(name) => write!(f, "{name}()"),
            PathStep::Any => f.write_str("[]"),
        }
    }
}

/// A parsed key path.
pub type Path = Vec<PathStep>;

/// One array boundary crossed by a concrete path.
///
/// `specific` is the path truncated through the index, `generic` is the same
/// prefix with that index replaced by `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    pub specific: String,
    pub generic: String,
    pub index: usize,
}
