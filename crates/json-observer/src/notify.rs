//! The notification cascade.
//!
//! For one mutated key, listeners are collected from the most specific
//! registration to the least specific one:
//!
//! 1. element patterns (`key[]`, `key[n]`), once per element diff
//! 2. the exact key
//! 3. every array checkpoint crossed by the key, outermost first
//! 4. every ancestor, nearest first
//! 5. the wildcard
//!
//! A listener is dispatched at most once per `notify` call; only the element
//! stage may hit a generic listener once per element. The full dispatch plan
//! is built before the first callback runs.

use crate::accessor::resolve;
use crate::error::ObserverError;
use crate::registry::Listener;
use crate::types::{Changes, ListenerId, Message, Operation};
use crate::Observer;
use json_observer_path::{ancestors, canonical_key, parse_path, permutate_key, PathStep, WILDCARD};
use json_observer_util::Node;
use std::collections::HashSet;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Element,
    Exact,
    Checkpoint,
    Ancestor,
    Wildcard,
    Rebind,
}

struct Dispatch<'r> {
    listener: &'r Listener,
    stage: Stage,
    message: Message,
}

struct Cascade<'r, 'c> {
    key: String,
    operation: &'c Operation,
    changes: &'c Changes,
    fired: HashSet<ListenerId>,
    plan: Vec<Dispatch<'r>>,
}

impl<'r, 'c> Cascade<'r, 'c> {
    fn new(key: String, operation: &'c Operation, changes: &'c Changes) -> Self {
        Self {
            key,
            operation,
            changes,
            fired: HashSet::new(),
            plan: Vec::new(),
        }
    }

    fn message(&self, old_value: Option<Node>, current_value: Option<Node>, index: Option<usize>) -> Message {
        Message {
            key: self.key.clone(),
            operation: self.operation.clone(),
            old_value,
            current_value,
            changes: self.changes.clone(),
            index,
        }
    }

    fn offer(
        &mut self,
        listeners: &'r [Listener],
        stage: Stage,
        old_value: &Option<Node>,
        current_value: &Option<Node>,
        index: Option<usize>,
    ) {
        for listener in listeners {
            if !listener.accepts(self.operation.as_str()) || !self.fired.insert(listener.id) {
                continue;
            }
            let message = self.message(old_value.clone(), current_value.clone(), index);
            self.plan.push(Dispatch {
                listener,
                stage,
                message,
            });
        }
    }

    /// Like `offer`, but leaves the fired set alone so the same listener can
    /// be planned again for the next element.
    fn offer_repeatable(
        &mut self,
        listeners: &'r [Listener],
        old_value: &Option<Node>,
        current_value: &Option<Node>,
        index: Option<usize>,
    ) -> Vec<ListenerId> {
        let mut ids = Vec::new();
        for listener in listeners {
            if !listener.accepts(self.operation.as_str()) || self.fired.contains(&listener.id) {
                continue;
            }
            let message = self.message(old_value.clone(), current_value.clone(), index);
            self.plan.push(Dispatch {
                listener,
                stage: Stage::Element,
                message,
            });
            ids.push(listener.id);
        }
        ids
    }

    fn run(self) -> Result<(), ObserverError> {
        for dispatch in self.plan {
            let listener = dispatch.listener;
            trace!(
                listener = listener.id.0,
                path = %listener.path,
                stage = ?dispatch.stage,
                "dispatch"
            );
            listener
                .callback
                .call(&dispatch.message, listener.context.as_ref())
                .map_err(|source| ObserverError::Listener {
                    key: listener.path.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn read(root: &Node, key: &str) -> Option<Node> {
    resolve(root, &parse_path(key)).into_option()
}

fn trailing_index(key: &str) -> Option<usize> {
    match parse_path(key).last() {
        Some(PathStep::Index(idx)) => Some(*idx),
        _ => None,
    }
}

fn element_key(collection: &str, index: Option<usize>) -> String {
    match index {
        Some(idx) => format!("{collection}[{idx}]"),
        None => format!("{collection}[]"),
    }
}

impl Observer {
    /// Broadcasts a mutation of `key` to every listener it concerns.
    ///
    /// `old_root` and `new_root` are the whole target before and after the
    /// mutation; each listener receives the values resolved at its own depth.
    /// With [`Changes::Elements`], generic element listeners fire once per
    /// element diff, in the order given.
    ///
    /// # Errors
    ///
    /// The first failing callback aborts the cascade and is returned as
    /// [`ObserverError::Listener`].
    pub fn notify(
        &self,
        key: &str,
        operation: &Operation,
        old_root: &Node,
        new_root: &Node,
        changes: &Changes,
    ) -> Result<(), ObserverError> {
        let key = canonical_key(key);
        let checkpoints = permutate_key(&key);
        trace!(
            key = %key,
            operation = %operation,
            checkpoints = checkpoints.len(),
            "notify"
        );
        let registry = &self.registry;
        let mut cascade = Cascade::new(key.clone(), operation, changes);

        let elements = changes.elements();
        if !elements.is_empty() {
            let generic = element_key(&key, None);
            let mut element_fired = Vec::new();
            for element in elements {
                let index = element.position();
                element_fired.extend(cascade.offer_repeatable(
                    registry.generic(&generic),
                    &element.value.old,
                    &element.value.current,
                    index,
                ));
                if let Some(idx) = index {
                    let slot = element_key(&key, Some(idx));
                    cascade.offer(
                        registry.specific(&slot),
                        Stage::Element,
                        &read(old_root, &slot),
                        &read(new_root, &slot),
                        Some(idx),
                    );
                }
            }
            cascade.fired.extend(element_fired);
        }

        let (old_value, current_value, index) = match elements {
            [single] => (
                single.value.old.clone(),
                single.value.current.clone(),
                single.position(),
            ),
            _ => (read(old_root, &key), read(new_root, &key), trailing_index(&key)),
        };
        cascade.offer(
            registry.specific(&key),
            Stage::Exact,
            &old_value,
            &current_value,
            index,
        );

        for checkpoint in &checkpoints {
            let old_value = read(old_root, &checkpoint.specific);
            let current_value = read(new_root, &checkpoint.specific);
            let index = Some(checkpoint.index);
            cascade.offer(
                registry.generic(&checkpoint.generic),
                Stage::Checkpoint,
                &old_value,
                &current_value,
                index,
            );
            cascade.offer(
                registry.specific(&checkpoint.specific),
                Stage::Checkpoint,
                &old_value,
                &current_value,
                index,
            );
        }

        for ancestor in ancestors(&key) {
            cascade.offer(
                registry.specific(&ancestor),
                Stage::Ancestor,
                &read(old_root, &ancestor),
                &read(new_root, &ancestor),
                trailing_index(&ancestor),
            );
        }

        cascade.offer(
            registry.specific(WILDCARD),
            Stage::Wildcard,
            &Some(old_root.clone()),
            &Some(new_root.clone()),
            None,
        );

        cascade.run()
    }

    /// Broadcasts a target rebind to the configured rebind keys and the
    /// wildcard.
    pub(crate) fn notify_rebind(&self, old_target: &Node, new_target: &Node) -> Result<(), ObserverError> {
        let key = self
            .config
            .rebind_keys
            .first()
            .cloned()
            .unwrap_or_else(|| "target".to_string());
        trace!(key = %key, "notify rebind");
        let operation = Operation::Bind;
        let changes = Changes::value(key.clone(), Some(old_target.clone()), Some(new_target.clone()));
        let mut cascade = Cascade::new(key, &operation, &changes);
        let old_value = Some(old_target.clone());
        let current_value = Some(new_target.clone());
        for rebind_key in &self.config.rebind_keys {
            cascade.offer(
                self.registry.specific(&canonical_key(rebind_key)),
                Stage::Rebind,
                &old_value,
                &current_value,
                None,
            );
        }
        cascade.offer(
            self.registry.specific(WILDCARD),
            Stage::Wildcard,
            &old_value,
            &current_value,
            None,
        );
        cascade.run()
    }
}
