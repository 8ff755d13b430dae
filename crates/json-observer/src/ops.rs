//! Collection and structural mutations.
//!
//! Every operation snapshots the target, mutates it in place, builds the
//! per-element diff and runs the notification cascade before returning.

use crate::accessor::{get_mut, take, write};
use crate::error::ObserverError;
use crate::types::{Changes, ElementChange, IndexChange, Operation, ValueChange};
use crate::Observer;
use indexmap::IndexMap;
use json_observer_path::{canonical_key, common_ancestor, is_child, parse_path, Path, PathStep};
use json_observer_util::Node;
use std::cmp::Ordering;
use tracing::debug;

fn locate(path: &str) -> (String, Path) {
    let key = canonical_key(path);
    let steps = parse_path(&key);
    (key, steps)
}

fn collection<'a>(target: &'a mut Node, key: &str, steps: &[PathStep]) -> Result<&'a mut Vec<Node>, ObserverError> {
    match get_mut(target, steps) {
        Some(Node::Array(list)) => Ok(list),
        Some(_) => Err(ObserverError::NotArray {
            path: key.to_string(),
        }),
        None => Err(ObserverError::NotFound {
            path: key.to_string(),
        }),
    }
}

impl Observer {
    fn array_at(&mut self, key: &str, steps: &[PathStep]) -> Result<(Node, &mut Vec<Node>), ObserverError> {
        let before = self.target.clone();
        let list = collection(&mut self.target, key, steps)?;
        Ok((before, list))
    }

    /// Appends `item` to the array at `path` (`""` is the target itself).
    ///
    /// # Errors
    ///
    /// [`ObserverError::NotFound`] or [`ObserverError::NotArray`] when `path`
    /// does not hold an array, and listener failures.
    pub fn push(&mut self, path: &str, item: impl Into<Node>) -> Result<&mut Self, ObserverError> {
        self.push_with(path, item, |_, _| {})
    }

    /// Like [`push`](Self::push); `on_pushed` then receives the collection
    /// and the item, after listeners have run.
    pub fn push_with<F>(&mut self, path: &str, item: impl Into<Node>, on_pushed: F) -> Result<&mut Self, ObserverError>
    where
        F: FnOnce(&Node, &Node),
    {
        let item = item.into();
        let (key, steps) = locate(path);
        let (before, list) = self.array_at(&key, &steps)?;
        let index = list.len();
        list.push(item.clone());
        let changes = Changes::Elements(vec![ElementChange::added(index, item.clone())]);
        self.notify(&key, &Operation::Push, &before, &self.target, &changes)?;
        if let Some(list) = get_mut(&mut self.target, &steps) {
            on_pushed(list, &item);
        }
        Ok(self)
    }

    /// Removes and returns the last element. An empty array yields `None`
    /// and notifies nobody.
    pub fn pop(&mut self, path: &str) -> Result<Option<Node>, ObserverError> {
        let (key, steps) = locate(path);
        let (before, list) = self.array_at(&key, &steps)?;
        let Some(item) = list.pop() else {
            debug!(key = %key, "pop on empty array");
            return Ok(None);
        };
        let index = list.len();
        let changes = Changes::Elements(vec![ElementChange::removed(index, item.clone())]);
        self.notify(&key, &Operation::Pop, &before, &self.target, &changes)?;
        Ok(Some(item))
    }

    /// Splices `item` in at `index`.
    ///
    /// The diff lists every shifted element in ascending order, then the
    /// inserted one. Inserting at the length only reports the new element.
    ///
    /// # Errors
    ///
    /// [`ObserverError::IndexOutOfBounds`] when `index` exceeds the length.
    pub fn insert(&mut self, path: &str, index: usize, item: impl Into<Node>) -> Result<&mut Self, ObserverError> {
        let item = item.into();
        let (key, steps) = locate(path);
        let (before, list) = self.array_at(&key, &steps)?;
        let len = list.len();
        if index > len {
            return Err(ObserverError::IndexOutOfBounds {
                path: key,
                index,
                len,
            });
        }
        let mut diffs: Vec<ElementChange> = list[index..]
            .iter()
            .enumerate()
            .map(|(offset, value)| ElementChange::moved(index + offset, index + offset + 1, value.clone()))
            .collect();
        list.insert(index, item.clone());
        diffs.push(ElementChange::added(index, item));
        let changes = Changes::Elements(diffs);
        self.notify(&key, &Operation::Insert, &before, &self.target, &changes)?;
        Ok(self)
    }

    /// Deletes an object member or splices out an array element, at any
    /// depth (`arr[0].v1`). A path that does not resolve returns `None`.
    pub fn remove(&mut self, path: &str) -> Result<Option<Node>, ObserverError> {
        let (key, steps) = locate(path);
        let before = self.target.clone();
        let Some(old) = take(&mut self.target, &steps) else {
            debug!(key = %key, "remove skipped, path does not resolve");
            return Ok(None);
        };
        let changes = Changes::value(key.clone(), Some(old.clone()), None);
        self.notify(&key, &Operation::Remove, &before, &self.target, &changes)?;
        Ok(Some(old))
    }

    /// Keeps the elements for which `predicate` holds.
    ///
    /// Removed elements are reported in descending original index. Nothing
    /// is notified when every element is kept.
    pub fn filter<F>(&mut self, path: &str, mut predicate: F) -> Result<&mut Self, ObserverError>
    where
        F: FnMut(&Node) -> bool,
    {
        let (key, steps) = locate(path);
        let (before, list) = self.array_at(&key, &steps)?;
        let mut removed = Vec::new();
        let mut index = 0;
        list.retain(|item| {
            let keep = predicate(item);
            if !keep {
                removed.push(ElementChange::removed(index, item.clone()));
            }
            index += 1;
            keep
        });
        if removed.is_empty() {
            return Ok(self);
        }
        removed.reverse();
        let changes = Changes::Elements(removed);
        self.notify(&key, &Operation::Filter, &before, &self.target, &changes)?;
        Ok(self)
    }

    /// Stable sort by a derived key.
    ///
    /// Keys that do not compare with themselves, such as `NaN`, sort after
    /// all others and keep their relative order. Other pairs that fail to
    /// compare are treated as equal.
    ///
    /// Every element that changed position is reported in ascending
    /// destination order, with the slot's previous occupant as old value.
    /// Listeners see the operation as `filter`.
    pub fn sort_by<K, F>(&mut self, path: &str, mut key_fn: F) -> Result<&mut Self, ObserverError>
    where
        K: PartialOrd,
        F: FnMut(&Node) -> K,
    {
        let (key, steps) = locate(path);
        let (before, list) = self.array_at(&key, &steps)?;
        let keys: Vec<K> = list.iter().map(|item| key_fn(item)).collect();
        let mut order: Vec<usize> = (0..list.len()).collect();
        let unordered: Vec<bool> = keys.iter().map(|k| k.partial_cmp(k).is_none()).collect();
        order.sort_by(|&a, &b| match (unordered[a], unordered[b]) {
            (false, false) => keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal),
            (ua, ub) => ua.cmp(&ub),
        });

        let previous = std::mem::take(list);
        let mut diffs = Vec::new();
        for (dest, &src) in order.iter().enumerate() {
            if dest != src {
                diffs.push(ElementChange {
                    index: IndexChange {
                        old: Some(src),
                        current: Some(dest),
                    },
                    value: ValueChange {
                        old: Some(previous[dest].clone()),
                        current: Some(previous[src].clone()),
                    },
                });
            }
        }
        *list = order.iter().map(|&src| previous[src].clone()).collect();
        if diffs.is_empty() {
            return Ok(self);
        }
        let changes = Changes::Elements(diffs);
        self.notify(&key, &Operation::Filter, &before, &self.target, &changes)?;
        Ok(self)
    }

    /// Exchanges the values at two paths, in the same or in different
    /// containers.
    ///
    /// One notification is sent, keyed on the deepest common ancestor of the
    /// two paths. Equal values are not swapped.
    ///
    /// # Errors
    ///
    /// [`ObserverError::NotFound`] when a path does not resolve and
    /// [`ObserverError::OverlappingPaths`] when one contains the other.
    pub fn swap(&mut self, path_a: &str, path_b: &str) -> Result<&mut Self, ObserverError> {
        let (key_a, steps_a) = locate(path_a);
        let (key_b, steps_b) = locate(path_b);
        if key_a == key_b {
            return Ok(self);
        }
        if is_child(&key_a, &key_b) || is_child(&key_b, &key_a) {
            return Err(ObserverError::OverlappingPaths { a: key_a, b: key_b });
        }
        let value_a = self.existing(&key_a, &steps_a)?;
        let value_b = self.existing(&key_b, &steps_b)?;
        if value_a == value_b {
            debug!(a = %key_a, b = %key_b, "swap skipped, values equal");
            return Ok(self);
        }
        let before = self.target.clone();
        if !write(&mut self.target, &steps_a, value_b.clone()) {
            return Err(ObserverError::NotFound { path: key_a });
        }
        if !write(&mut self.target, &steps_b, value_a.clone()) {
            self.target = before;
            return Err(ObserverError::NotFound { path: key_b });
        }

        let mut values = IndexMap::new();
        values.insert(
            key_a.clone(),
            ValueChange {
                old: Some(value_a.clone()),
                current: Some(value_b.clone()),
            },
        );
        values.insert(
            key_b.clone(),
            ValueChange {
                old: Some(value_b),
                current: Some(value_a),
            },
        );
        let key = common_ancestor(&key_a, &key_b);
        let changes = Changes::Values(values);
        self.notify(&key, &Operation::Swap, &before, &self.target, &changes)?;
        Ok(self)
    }

    fn existing(&mut self, key: &str, steps: &[PathStep]) -> Result<Node, ObserverError> {
        get_mut(&mut self.target, steps)
            .cloned()
            .ok_or_else(|| ObserverError::NotFound {
                path: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_shape_errors() {
        let mut obs = Observer::from_json(&json!({"n": 1}));
        assert!(matches!(obs.push("n", 2), Err(ObserverError::NotArray { .. })));
        assert!(matches!(obs.pop("missing"), Err(ObserverError::NotFound { .. })));
        assert!(matches!(obs.push("", 1), Err(ObserverError::NotArray { .. })));
    }

    #[test]
    fn test_push_pop_on_root_array() {
        let mut obs = Observer::with_config(crate::ObserverConfig::array());
        obs.push("", 1).unwrap().push("", 2).unwrap();
        assert_eq!(obs.pop("").unwrap(), Some(Node::from(2)));
        assert_eq!(obs.target().to_json(), json!([1]));
        obs.pop("").unwrap();
        assert_eq!(obs.pop("").unwrap(), None);
    }

    #[test]
    fn test_push_with_sees_collection() {
        let mut obs = Observer::from_json(&json!({"list": [1]}));
        let mut seen = None;
        obs.push_with("list", 2, |list, item| {
            seen = Some((list.to_json(), item.to_json()));
        })
        .unwrap();
        assert_eq!(seen, Some((json!([1, 2]), json!(2))));
    }

    #[test]
    fn test_insert_out_of_bounds() {
        let mut obs = Observer::from_json(&json!({"list": [1]}));
        let err = obs.insert("list", 3, 0).unwrap_err();
        assert!(matches!(
            err,
            ObserverError::IndexOutOfBounds { index: 3, len: 1, .. }
        ));
        assert_eq!(obs.target().to_json(), json!({"list": [1]}));
    }

    #[test]
    fn test_sort_by_is_stable() {
        let mut obs = Observer::from_json(&json!({
            "list": [{"k": 2, "id": "a"}, {"k": 1, "id": "b"}, {"k": 2, "id": "c"}]
        }));
        obs.sort_by("list", |item| {
            item.as_object()
                .and_then(|obj| obj.get("k"))
                .and_then(Node::as_i64)
                .unwrap_or_default()
        })
        .unwrap();
        assert_eq!(
            obs.target().to_json(),
            json!({"list": [{"k": 1, "id": "b"}, {"k": 2, "id": "a"}, {"k": 2, "id": "c"}]})
        );
    }

    #[test]
    fn test_swap_rejects_overlap() {
        let mut obs = Observer::from_json(&json!({"a": {"b": 1}}));
        assert!(matches!(
            obs.swap("a", "a.b"),
            Err(ObserverError::OverlappingPaths { .. })
        ));
        assert!(matches!(obs.swap("a.b", "x"), Err(ObserverError::NotFound { .. })));
    }
}
