//! Listener storage.
//!
//! Two ordered maps from canonical path to listeners in registration order:
//! `specific` holds literal paths and the wildcard, `generic` holds paths
//! with a `[]` element pattern.

use crate::types::{Callback, Context, ListenerId};
use indexmap::IndexMap;
use json_observer_path::{canonical_key, is_generic};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    pub id: ListenerId,
    pub path: String,
    /// `None` accepts every operation.
    pub operations: Option<BTreeSet<String>>,
    pub context: Option<Context>,
    pub callback: Callback,
}

impl Listener {
    pub fn accepts(&self, operation: &str) -> bool {
        match &self.operations {
            None => true,
            Some(ops) => ops.contains(operation),
        }
    }
}

/// Which listeners a removal applies to. Unset dimensions match anything.
#[derive(Debug, Default)]
pub(crate) struct RemoveFilter<'a> {
    pub paths: Option<Vec<String>>,
    pub operations: Vec<String>,
    pub context: Option<&'a Context>,
    pub callback: Option<&'a Callback>,
}

impl RemoveFilter<'_> {
    fn targets(&self, listener: &Listener) -> bool {
        let context_matches = match (self.context, &listener.context) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.ptr_eq(actual),
            (Some(_), None) => false,
        };
        let callback_matches = self
            .callback
            .map_or(true, |wanted| wanted.ptr_eq(&listener.callback));
        context_matches && callback_matches
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    specific: IndexMap<String, Vec<Listener>>,
    generic: IndexMap<String, Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn add(
        &mut self,
        path: &str,
        operations: &[String],
        context: Option<Context>,
        callback: Callback,
    ) -> ListenerId {
        self.next_id = self.next_id.saturating_add(1);
        let id = ListenerId(self.next_id);
        let path = canonical_key(path);
        let operations = if operations.is_empty() {
            None
        } else {
            Some(operations.iter().cloned().collect())
        };
        let listener = Listener {
            id,
            path: path.clone(),
            operations,
            context,
            callback,
        };
        let map = if is_generic(&path) {
            &mut self.generic
        } else {
            &mut self.specific
        };
        map.entry(path).or_default().push(listener);
        id
    }

    /// Removes matching listeners and returns how many were dropped.
    ///
    /// With operations in the filter, only listeners that carry an operation
    /// set are affected: the named operations are taken out of the set and
    /// the listener is dropped once its set is empty.
    pub fn remove(&mut self, filter: &RemoveFilter<'_>) -> usize {
        let mut removed = 0;
        for map in [&mut self.specific, &mut self.generic] {
            for (path, list) in map.iter_mut() {
                if let Some(paths) = &filter.paths {
                    if !paths.iter().any(|p| p == path) {
                        continue;
                    }
                }
                list.retain_mut(|listener| {
                    if !filter.targets(listener) {
                        return true;
                    }
                    if filter.operations.is_empty() {
                        removed += 1;
                        return false;
                    }
                    let Some(ops) = listener.operations.as_mut() else {
                        return true;
                    };
                    ops.retain(|op| !filter.operations.contains(op));
                    if ops.is_empty() {
                        removed += 1;
                        return false;
                    }
                    true
                });
            }
            map.retain(|_, list| !list.is_empty());
        }
        removed
    }

    pub fn clear(&mut self) {
        self.specific.clear();
        self.generic.clear();
    }

    pub fn specific(&self, path: &str) -> &[Listener] {
        self.specific.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn generic(&self, path: &str) -> &[Listener] {
        self.generic.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.specific
            .values()
            .chain(self.generic.values())
            .map(Vec::len)
            .sum()
    }

    pub fn len_at(&self, path: &str) -> usize {
        let path = canonical_key(path);
        self.specific(&path).len() + self.generic(&path).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::new(|_, _| Ok(()))
    }

    fn ops(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_add_splits_specific_and_generic() {
        let mut registry = ListenerRegistry::default();
        registry.add("a.b", &[], None, noop());
        registry.add("list[]", &[], None, noop());
        registry.add("list[ 2 ]", &[], None, noop());
        registry.add("*", &[], None, noop());
        assert_eq!(registry.specific("a.b").len(), 1);
        assert_eq!(registry.generic("list[]").len(), 1);
        assert_eq!(registry.specific("list[2]").len(), 1);
        assert_eq!(registry.specific("*").len(), 1);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_ids_increase_in_registration_order() {
        let mut registry = ListenerRegistry::default();
        let a = registry.add("x", &[], None, noop());
        let b = registry.add("x", &[], None, noop());
        assert!(a < b);
        let ids: Vec<_> = registry.specific("x").iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_accepts_operation_filter() {
        let mut registry = ListenerRegistry::default();
        registry.add("x", &ops(&["set", "push"]), None, noop());
        registry.add("y", &[], None, noop());
        let x = &registry.specific("x")[0];
        assert!(x.accepts("set"));
        assert!(!x.accepts("pop"));
        assert!(registry.specific("y")[0].accepts("anything"));
    }

    #[test]
    fn test_remove_by_callback_everywhere() {
        let mut registry = ListenerRegistry::default();
        let cb = noop();
        registry.add("a", &[], None, cb.clone());
        registry.add("b[]", &[], None, cb.clone());
        registry.add("a", &[], None, noop());
        let removed = registry.remove(&RemoveFilter {
            callback: Some(&cb),
            ..Default::default()
        });
        assert_eq!(removed, 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.generic("b[]").is_empty());
    }

    #[test]
    fn test_remove_operation_from_set() {
        let mut registry = ListenerRegistry::default();
        registry.add("a", &ops(&["set", "push"]), None, noop());
        registry.add("a", &[], None, noop());
        let removed = registry.remove(&RemoveFilter {
            operations: ops(&["set"]),
            ..Default::default()
        });
        assert_eq!(removed, 0);
        assert_eq!(registry.len(), 2);
        assert!(!registry.specific("a")[0].accepts("set"));
        assert!(registry.specific("a")[0].accepts("push"));

        let removed = registry.remove(&RemoveFilter {
            operations: ops(&["push"]),
            ..Default::default()
        });
        assert_eq!(removed, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_with_context() {
        let mut registry = ListenerRegistry::default();
        let ctx = Context::new(1u8);
        registry.add("a", &[], Some(ctx.clone()), noop());
        registry.add("a", &[], Some(Context::new(1u8)), noop());
        registry.add("a", &[], None, noop());
        let removed = registry.remove(&RemoveFilter {
            paths: Some(vec!["a".into()]),
            context: Some(&ctx),
            ..Default::default()
        });
        assert_eq!(removed, 1);
        assert_eq!(registry.len_at("a"), 2);
    }

    #[test]
    fn test_clear() {
        let mut registry = ListenerRegistry::default();
        registry.add("a", &[], None, noop());
        registry.add("a[]", &[], None, noop());
        registry.clear();
        assert_eq!(registry.len(), 0);
    }
}
