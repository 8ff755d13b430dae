use crate::accessor::{resolve, write};
use crate::config::ObserverConfig;
use crate::error::ObserverError;
use crate::registry::{ListenerRegistry, RemoveFilter};
use crate::types::{Callback, Changes, Context, Operation};
use json_observer_path::{
    canonical_key, keys_and_operations, normalize_key, parse_path, validate_key, WILDCARD,
};
use json_observer_util::{deep_clone, Node};
use serde_json::Value;
use tracing::debug;

/// An observed value graph.
///
/// The observer owns its target. Every mutation goes through it and is
/// broadcast synchronously to the registered listeners before the mutating
/// call returns.
///
/// Listener callbacks only see the [`Message`](crate::Message), never the
/// observer, so the registry cannot change while a cascade is running.
#[derive(Debug)]
pub struct Observer {
    pub(crate) target: Node,
    pub(crate) config: ObserverConfig,
    pub(crate) registry: ListenerRegistry,
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer {
    /// Observer over an empty object.
    pub fn new() -> Self {
        Self::with_config(ObserverConfig::default())
    }

    pub fn with_config(config: ObserverConfig) -> Self {
        Self {
            target: config.store.empty(),
            config,
            registry: ListenerRegistry::default(),
        }
    }

    pub fn with_target(target: Node) -> Self {
        Self {
            target,
            config: ObserverConfig::default(),
            registry: ListenerRegistry::default(),
        }
    }

    pub fn from_json(value: &Value) -> Self {
        Self::with_target(Node::from(value))
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    /// The live target.
    pub fn target(&self) -> &Node {
        &self.target
    }

    /// Deep copy of the target; functions in it are replaced by `null`.
    pub fn get_bound_object(&self) -> Node {
        deep_clone(&self.target)
    }

    /// Replaces the target wholesale. Listeners are kept.
    ///
    /// Listeners on the configured rebind keys and on `*` receive the old and
    /// the new target.
    pub fn bind_to(&mut self, target: Node) -> Result<&mut Self, ObserverError> {
        let old = std::mem::replace(&mut self.target, target);
        debug!(
            from = old.type_name(),
            to = self.target.type_name(),
            "rebinding target"
        );
        self.notify_rebind(&old, &self.target)?;
        Ok(self)
    }

    /// Reads a key path. `None` when any segment is absent.
    pub fn get(&self, path: &str) -> Option<Node> {
        resolve(&self.target, &parse_path(path)).into_option()
    }

    /// Writes `value` at `path` and notifies.
    ///
    /// Nothing happens when the path already holds an equal value, or when
    /// an ancestor of the path is missing.
    pub fn set(&mut self, path: &str, value: impl Into<Node>) -> Result<&mut Self, ObserverError> {
        let value = value.into();
        let key = canonical_key(path);
        let steps = parse_path(&key);
        let old = resolve(&self.target, &steps).into_option();
        if old.as_ref() == Some(&value) {
            debug!(key = %key, "set skipped, value unchanged");
            return Ok(self);
        }
        let before = self.target.clone();
        if !write(&mut self.target, &steps, value.clone()) {
            debug!(key = %key, "set skipped, path does not resolve");
            return Ok(self);
        }
        let changes = Changes::value(key.clone(), old, Some(value));
        self.notify(&key, &Operation::Set, &before, &self.target, &changes)?;
        Ok(self)
    }

    fn register(
        &mut self,
        spec: Option<&str>,
        context: Option<&Context>,
        callback: &Callback,
    ) -> Result<&mut Self, ObserverError> {
        let (keys, operations) = keys_and_operations(spec);
        let operations: Vec<String> = operations.into_iter().filter(|op| !op.is_empty()).collect();
        let mut keys: Vec<String> = keys
            .into_iter()
            .filter(|key| !normalize_key(key).is_empty())
            .collect();
        if keys.is_empty() {
            keys.push(WILDCARD.to_string());
        }
        for key in &keys {
            validate_key(key).map_err(|source| ObserverError::InvalidKeySpec {
                spec: spec.unwrap_or_default().to_string(),
                source,
            })?;
        }
        for key in keys {
            let id = self
                .registry
                .add(&key, &operations, context.cloned(), callback.clone());
            debug!(
                listener = id.0,
                key = %key,
                operations = operations.len(),
                with_context = context.is_some(),
                "listener added"
            );
        }
        Ok(self)
    }

    /// Listens to every mutation.
    pub fn add_listener(&mut self, callback: &Callback) -> Result<&mut Self, ObserverError> {
        self.register(None, None, callback)
    }

    /// Listens on the keys and operations of a key spec
    /// (`"key1, key2:op1, op2"`).
    ///
    /// # Errors
    ///
    /// [`ObserverError::InvalidKeySpec`] when a key is malformed; nothing is
    /// registered then.
    pub fn add_listener_at(&mut self, spec: &str, callback: &Callback) -> Result<&mut Self, ObserverError> {
        self.register(Some(spec), None, callback)
    }

    /// Like [`add_listener_at`](Self::add_listener_at), with a context passed
    /// to the callback and usable as a removal key.
    pub fn add_listener_with(
        &mut self,
        spec: &str,
        context: &Context,
        callback: &Callback,
    ) -> Result<&mut Self, ObserverError> {
        self.register(Some(spec), Some(context), callback)
    }

    /// Listens to every mutation with a context.
    pub fn add_listener_for(&mut self, context: &Context, callback: &Callback) -> Result<&mut Self, ObserverError> {
        self.register(None, Some(context), callback)
    }

    pub fn add_observer(&mut self, callback: &Callback) -> Result<&mut Self, ObserverError> {
        self.add_listener(callback)
    }

    pub fn add_observer_at(&mut self, spec: &str, callback: &Callback) -> Result<&mut Self, ObserverError> {
        self.add_listener_at(spec, callback)
    }

    pub fn add_observer_with(
        &mut self,
        spec: &str,
        context: &Context,
        callback: &Callback,
    ) -> Result<&mut Self, ObserverError> {
        self.add_listener_with(spec, context, callback)
    }

    pub fn add_observer_for(&mut self, context: &Context, callback: &Callback) -> Result<&mut Self, ObserverError> {
        self.add_listener_for(context, callback)
    }

    fn unregister(&mut self, spec: Option<&str>, filter: RemoveFilter<'_>) -> &mut Self {
        let mut filter = filter;
        if let Some(spec) = spec {
            let (keys, operations) = keys_and_operations(spec);
            let paths: Vec<String> = keys
                .iter()
                .filter(|key| !normalize_key(key).is_empty())
                .map(|key| canonical_key(key))
                .collect();
            filter.paths = (!paths.is_empty()).then_some(paths);
            filter.operations = operations.into_iter().filter(|op| !op.is_empty()).collect();
        }
        let removed = self.registry.remove(&filter);
        debug!(spec = spec.unwrap_or_default(), removed, "listeners removed");
        self
    }

    /// Removes every listener.
    pub fn remove_all_listeners(&mut self) -> &mut Self {
        self.reset_listeners()
    }

    /// Removes this callback wherever it is registered.
    pub fn remove_callback(&mut self, callback: &Callback) -> &mut Self {
        self.unregister(
            None,
            RemoveFilter {
                callback: Some(callback),
                ..Default::default()
            },
        )
    }

    /// Removes listeners matching a key spec, whatever their context.
    ///
    /// An empty key part (`":op"`) matches every path.
    pub fn remove_listener_at(&mut self, spec: &str) -> &mut Self {
        self.unregister(Some(spec), RemoveFilter::default())
    }

    /// Removes listeners matching a key spec and registered with `context`.
    pub fn remove_listener_with(&mut self, spec: &str, context: &Context) -> &mut Self {
        self.unregister(
            Some(spec),
            RemoveFilter {
                context: Some(context),
                ..Default::default()
            },
        )
    }

    /// Removes every listener registered with `context`.
    pub fn remove_listener_for(&mut self, context: &Context) -> &mut Self {
        self.unregister(
            None,
            RemoveFilter {
                context: Some(context),
                ..Default::default()
            },
        )
    }

    pub fn remove_observer(&mut self, callback: &Callback) -> &mut Self {
        self.remove_callback(callback)
    }

    pub fn remove_observer_at(&mut self, spec: &str) -> &mut Self {
        self.remove_listener_at(spec)
    }

    pub fn remove_observer_with(&mut self, spec: &str, context: &Context) -> &mut Self {
        self.remove_listener_with(spec, context)
    }

    pub fn remove_observer_for(&mut self, context: &Context) -> &mut Self {
        self.remove_listener_for(context)
    }

    /// Clears both registries.
    pub fn reset_listeners(&mut self) -> &mut Self {
        debug!(removed = self.registry.len(), "resetting listeners");
        self.registry.clear();
        self
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of listeners registered on exactly this key.
    pub fn listeners_at(&self, path: &str) -> usize {
        self.registry.len_at(path)
    }
}
