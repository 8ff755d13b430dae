use json_observer_path::PathError;
use thiserror::Error;

/// Error returned by a listener callback.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("invalid key spec `{spec}`: {source}")]
    InvalidKeySpec {
        spec: String,
        #[source]
        source: PathError,
    },
    #[error("path `{path}` not found")]
    NotFound { path: String },
    #[error("path `{path}` does not point to an array")]
    NotArray { path: String },
    #[error("index {index} out of bounds for `{path}` of length {len}")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("paths `{a}` and `{b}` overlap")]
    OverlappingPaths { a: String, b: String },
    #[error("listener on `{key}` failed: {source}")]
    Listener {
        key: String,
        #[source]
        source: ListenerError,
    },
}
