//! Notification payloads and listener handles.

use crate::error::ListenerError;
use indexmap::IndexMap;
use json_observer_util::Node;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// The mutation that produced a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Set,
    Push,
    Pop,
    Insert,
    Remove,
    /// Shared by `filter` and `sort_by`.
    Filter,
    Swap,
    /// Target rebinding through `bind_to`.
    Bind,
    /// Any operation name passed to `notify` by a caller.
    Named(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Set => "set",
            Operation::Push => "push",
            Operation::Pop => "pop",
            Operation::Insert => "insert",
            Operation::Remove => "remove",
            Operation::Filter => "filter",
            Operation::Swap => "swap",
            Operation::Bind => "bindTo",
            Operation::Named(name) => name,
        }
    }
}

impl From<&str> for Operation {
    fn from(name: &str) -> Self {
        match name {
            "set" => Operation::Set,
            "push" => Operation::Push,
            "pop" => Operation::Pop,
            "insert" => Operation::Insert,
            "remove" => Operation::Remove,
            "filter" => Operation::Filter,
            "swap" => Operation::Swap,
            "bindTo" => Operation::Bind,
            other => Operation::Named(other.to_string()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Old and current value at one location. A side is `None` when the
/// location did not exist.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ValueChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IndexChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<usize>,
}

/// Diff of one element of a collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ElementChange {
    pub index: IndexChange,
    pub value: ValueChange,
}

impl ElementChange {
    /// An element that appeared at `index`.
    pub fn added(index: usize, value: Node) -> Self {
        Self {
            index: IndexChange {
                old: None,
                current: Some(index),
            },
            value: ValueChange {
                old: None,
                current: Some(value),
            },
        }
    }

    /// An element that left `index`.
    pub fn removed(index: usize, value: Node) -> Self {
        Self {
            index: IndexChange {
                old: Some(index),
                current: None,
            },
            value: ValueChange {
                old: Some(value),
                current: None,
            },
        }
    }

    /// An element that moved from `old` to `current` unchanged.
    pub fn moved(old: usize, current: usize, value: Node) -> Self {
        Self {
            index: IndexChange {
                old: Some(old),
                current: Some(current),
            },
            value: ValueChange {
                old: Some(value.clone()),
                current: Some(value),
            },
        }
    }

    /// The slot this diff lands on: the current index, or the old one for
    /// removals.
    pub fn position(&self) -> Option<usize> {
        self.index.current.or(self.index.old)
    }
}

/// The diff handed to `notify`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Changes {
    #[default]
    None,
    /// Concrete key to value diff, for set-like operations.
    Values(IndexMap<String, ValueChange>),
    /// Ordered per-element diffs, for collection operations.
    Elements(Vec<ElementChange>),
}

impl Changes {
    pub fn value(key: impl Into<String>, old: Option<Node>, current: Option<Node>) -> Self {
        let mut values = IndexMap::new();
        values.insert(key.into(), ValueChange { old, current });
        Changes::Values(values)
    }

    pub fn elements(&self) -> &[ElementChange] {
        match self {
            Changes::Elements(list) => list,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Changes::None => true,
            Changes::Values(values) => values.is_empty(),
            Changes::Elements(list) => list.is_empty(),
        }
    }
}

/// Payload delivered to a listener.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// The mutated key.
    pub key: String,
    pub operation: Operation,
    /// Value before the mutation, resolved at the listener's depth.
    pub old_value: Option<Node>,
    /// Value after the mutation, resolved at the listener's depth.
    pub current_value: Option<Node>,
    pub changes: Changes,
    /// Set when the listener is bound to an array slot or a generic element
    /// pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Receiver object attached to a listener. Also acts as a removal key.
///
/// Contexts compare by identity: clones of one `Context` are the same
/// context, two `Context::new` calls never are.
#[derive(Clone)]
pub struct Context(Rc<dyn Any>);

impl Context {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

type CallbackFn = dyn Fn(&Message, Option<&Context>) -> Result<(), ListenerError>;

/// Shared handle to a listener function.
///
/// Clones refer to the same function, which is what `remove_callback`
/// matches on.
#[derive(Clone)]
pub struct Callback(Rc<CallbackFn>);

impl Callback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Message, Option<&Context>) -> Result<(), ListenerError> + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, message: &Message, context: Option<&Context>) -> Result<(), ListenerError> {
        (self.0)(message, context)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Registry-assigned listener identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);
