//! Path-addressable observation engine.
//!
//! An [`Observer`] owns a value graph (the target), reads and writes it by
//! key path (`a.b[2].c`) and broadcasts every mutation to the listeners
//! registered on the mutated key, on the arrays it crosses, on its ancestors
//! and on the wildcard `*`.
//!
//! # Example
//!
//! ```
//! use json_observer::{Callback, Observer};
//! use serde_json::json;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut obs = Observer::from_json(&json!({"todos": [{"done": false}]}));
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let on_todo = Callback::new(move |msg, _| {
//!     sink.borrow_mut().push((msg.key.clone(), msg.index));
//!     Ok(())
//! });
//! obs.add_listener_at("todos[]:set", &on_todo).unwrap();
//!
//! obs.set("todos[0].done", true).unwrap();
//! assert_eq!(*seen.borrow(), vec![("todos[0].done".to_string(), Some(0))]);
//! ```

mod accessor;
mod config;
mod error;
mod notify;
mod observer;
mod ops;
mod registry;
mod types;

pub use accessor::{get_path, resolve, resolve_key_path, Lookup};
pub use config::{ObserverConfig, StoreKind};
pub use error::{ListenerError, ObserverError};
pub use observer::Observer;
pub use types::{
    Callback, Changes, Context, ElementChange, IndexChange, ListenerId, Message, Operation,
    ValueChange,
};

pub use json_observer_path::{keys_and_operations, normalize_key, permutate_key, PathError, WILDCARD};
pub use json_observer_util::{deep_clone, Accessor, Node, Object};
