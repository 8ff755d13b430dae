use json_observer_util::Node;

/// Shape of the target an observer starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Plain object store, initial target `{}`.
    #[default]
    Object,
    /// Array store, initial target `[]`.
    Array,
}

impl StoreKind {
    pub fn empty(self) -> Node {
        match self {
            StoreKind::Object => Node::object(),
            StoreKind::Array => Node::array(),
        }
    }
}

/// Options for an [`Observer`](crate::Observer).
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    /// Initial target shape. Default is [`StoreKind::Object`].
    pub store: StoreKind,
    /// Listener keys notified when the target is rebound. Default is
    /// `["target", "boundObject"]`.
    pub rebind_keys: Vec<String>,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Object,
            rebind_keys: vec!["target".to_string(), "boundObject".to_string()],
        }
    }
}

impl ObserverConfig {
    pub fn array() -> Self {
        Self {
            store: StoreKind::Array,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObserverConfig::default();
        assert_eq!(config.store, StoreKind::Object);
        assert_eq!(config.rebind_keys, vec!["target", "boundObject"]);
        assert!(config.store.empty().as_object().is_some());
    }

    #[test]
    fn test_array_config() {
        let config = ObserverConfig::array();
        assert_eq!(config.store, StoreKind::Array);
        assert!(config.store.empty().as_array().is_some());
    }
}
