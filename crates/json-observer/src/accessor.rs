//! Reading and writing a value graph by key path.
//!
//! A path that does not resolve is never an error: reads report
//! [`Lookup::Missing`] and writes through a missing ancestor do nothing.

use json_observer_path::{parse_path, PathStep};
use json_observer_util::Node;
use std::borrow::Cow;

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Node),
    Missing,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn into_option(self) -> Option<Node> {
        match self {
            Lookup::Found(node) => Some(node),
            Lookup::Missing => None,
        }
    }
}

impl From<Lookup> for Option<Node> {
    fn from(lookup: Lookup) -> Self {
        lookup.into_option()
    }
}

fn child<'a>(node: &'a Node, step: &PathStep) -> Option<Cow<'a, Node>> {
    match (step, node) {
        (PathStep::Key(key), Node::Object(map)) => map.get(key).map(Cow::Borrowed),
        (PathStep::Key(key), Node::Array(arr)) => {
            if key == "length" {
                return Some(Cow::Owned(Node::from(arr.len())));
            }
            let idx: usize = key.parse().ok()?;
            arr.get(idx).map(Cow::Borrowed)
        }
        (PathStep::Index(idx), Node::Array(arr)) => arr.get(*idx).map(Cow::Borrowed),
        (PathStep::Index(idx), Node::Object(map)) => map.get(&idx.to_string()).map(Cow::Borrowed),
        (PathStep::Call(name), Node::Object(map)) => match map.get(name)? {
            Node::Function(f) => Some(Cow::Owned(f.call(node))),
            member => Some(Cow::Borrowed(member)),
        },
        _ => None,
    }
}

/// Resolves parsed steps against a root.
///
/// `Call` steps invoke the accessor stored under that name with its
/// container as receiver. A `Call` on a plain member reads the member.
pub fn resolve(root: &Node, steps: &[PathStep]) -> Lookup {
    let mut current: Cow<'_, Node> = Cow::Borrowed(root);
    for step in steps {
        current = match current {
            Cow::Borrowed(node) => match child(node, step) {
                Some(next) => next,
                None => return Lookup::Missing,
            },
            Cow::Owned(node) => match child(&node, step) {
                Some(next) => Cow::Owned(next.into_owned()),
                None => return Lookup::Missing,
            },
        };
    }
    Lookup::Found(current.into_owned())
}

/// Reads a key path. `None` when any segment is absent.
///
/// # Example
///
/// ```
/// use json_observer::get_path;
/// use json_observer_util::Node;
/// use serde_json::json;
///
/// let root = Node::from(json!({"a": {"list": [1, 2]}}));
/// assert_eq!(get_path(&root, "a.list[1]"), Some(Node::from(2)));
/// assert_eq!(get_path(&root, "a.missing.deeper"), None);
/// ```
pub fn get_path(root: &Node, key: &str) -> Option<Node> {
    resolve(root, &parse_path(key)).into_option()
}

/// Mutable access through plain member and index steps only.
pub fn get_mut<'a>(root: &'a mut Node, steps: &[PathStep]) -> Option<&'a mut Node> {
    let mut current = root;
    for step in steps {
        current = match (step, current) {
            (PathStep::Key(key), Node::Object(map)) => map.get_mut(key)?,
            (PathStep::Key(key), Node::Array(arr)) => {
                let idx: usize = key.parse().ok()?;
                arr.get_mut(idx)?
            }
            (PathStep::Index(idx), Node::Array(arr)) => arr.get_mut(*idx)?,
            (PathStep::Index(idx), Node::Object(map)) => map.get_mut(&idx.to_string())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at the location named by `steps`.
///
/// The final member is created or overwritten. An array accepts a write at
/// an existing index or at its length (append). Missing ancestors,
/// out-of-range indices, `Call` and generic steps make the write a no-op,
/// reported as `false`.
pub fn write(root: &mut Node, steps: &[PathStep], value: Node) -> bool {
    let Some((last, parent)) = steps.split_last() else {
        *root = value;
        return true;
    };
    let Some(container) = get_mut(root, parent) else {
        return false;
    };
    match (last, container) {
        (PathStep::Key(key), Node::Object(map)) => {
            map.insert(key.clone(), value);
            true
        }
        (PathStep::Index(idx), Node::Object(map)) => {
            map.insert(idx.to_string(), value);
            true
        }
        (step @ (PathStep::Key(_) | PathStep::Index(_)), Node::Array(arr)) => {
            let Some(idx) = step.as_index() else {
                return false;
            };
            if idx < arr.len() {
                arr[idx] = value;
                true
            } else if idx == arr.len() {
                arr.push(value);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Removes the member or element named by `steps` and returns it.
///
/// Object members are removed preserving the order of the remaining ones;
/// array elements are spliced out.
pub fn take(root: &mut Node, steps: &[PathStep]) -> Option<Node> {
    let (last, parent) = steps.split_last()?;
    match (last, get_mut(root, parent)?) {
        (PathStep::Key(key), Node::Object(map)) => map.shift_remove(key),
        (PathStep::Index(idx), Node::Object(map)) => map.shift_remove(&idx.to_string()),
        (step @ (PathStep::Key(_) | PathStep::Index(_)), Node::Array(arr)) => {
            let idx = step.as_index()?;
            (idx < arr.len()).then(|| arr.remove(idx))
        }
        _ => None,
    }
}

/// Resolves a key path for reading or, with `new_value`, for writing.
///
/// Returns the value now stored at the path, or [`Lookup::Missing`] when the
/// path does not resolve (for a write: when it was skipped).
///
/// # Example
///
/// ```
/// use json_observer::{resolve_key_path, Lookup};
/// use json_observer_util::Node;
/// use serde_json::json;
///
/// let mut root = Node::from(json!({"a": {"b": 1}}));
/// assert_eq!(resolve_key_path(&mut root, "a.b", None), Lookup::Found(Node::from(1)));
/// assert!(resolve_key_path(&mut root, "a.c", Some(Node::from(2))).is_found());
/// assert_eq!(resolve_key_path(&mut root, "x.y", Some(Node::from(3))), Lookup::Missing);
/// assert_eq!(root.to_json(), json!({"a": {"b": 1, "c": 2}}));
/// ```
pub fn resolve_key_path(root: &mut Node, key: &str, new_value: Option<Node>) -> Lookup {
    let steps = parse_path(key);
    match new_value {
        None => resolve(root, &steps),
        Some(value) => {
            if write(root, &steps, value) {
                resolve(root, &steps)
            } else {
                Lookup::Missing
            }
        }
    }
}
