//! Key path utilities for `json-observer`.
//!
//! Keys address locations in an observed value graph with `.` for member
//! traversal and `[n]` for array indices. Listener keys may additionally use
//! `[]` for "any index" and `*` for "anything".
//!
//! # Example
//!
//! ```
//! use json_observer_path::{keys_and_operations, normalize_key, parse_path, permutate_key, PathStep};
//!
//! assert_eq!(normalize_key("todos #  0"), "todos.0");
//!
//! let (keys, ops) = keys_and_operations("todos[], done:set");
//! assert_eq!(keys, vec!["todos[]", "done"]);
//! assert_eq!(ops, vec!["set"]);
//!
//! let steps = parse_path("todos[1].title");
//! assert_eq!(steps[1], PathStep::Index(1));
//!
//! let chain = permutate_key("todos[1].title");
//! assert_eq!(chain[0].generic, "todos[]");
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep, Permutation, WILDCARD};

pub mod validate;
pub use validate::validate_key;

mod permutate;
mod util;

pub use permutate::permutate_key;
pub use util::{
    ancestors, canonical_key, common_ancestor, format_path, is_child, is_generic,
    is_valid_index, keys_and_operations, normalize_key, parent_key, parse_path,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("NO_PARENT")]
    NoParent,
    #[error("unbalanced bracket in key `{key}`")]
    UnbalancedBracket { key: String },
    #[error("empty segment in key `{key}`")]
    EmptySegment { key: String },
    #[error("`[]` must be the last step of key `{key}`")]
    GenericNotLast { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("fi.fi.   fum"), "fi.fi.fum");
        assert_eq!(normalize_key("fi#fi"), "fi.fi");
        assert_eq!(normalize_key("0]"), "0");
        assert_eq!(normalize_key("a]]"), "a");
        assert_eq!(normalize_key("a[0]]"), "a[0]");
        assert_eq!(normalize_key("\tlist [ 1 ] . x\n"), "list[1].x");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_keys_and_operations() {
        let (keys, ops) = keys_and_operations("key1, key2:operation1, operation2");
        assert_eq!(keys, vec!["key1", "key2"]);
        assert_eq!(ops, vec!["operation1", "operation2"]);

        let (keys, ops) = keys_and_operations(":operation");
        assert_eq!(keys, vec![""]);
        assert_eq!(ops, vec!["operation"]);

        let (keys, ops) = keys_and_operations("");
        assert_eq!(keys, vec![""]);
        assert!(ops.is_empty());

        let (keys, ops) = keys_and_operations("only.key");
        assert_eq!(keys, vec!["only.key"]);
        assert!(ops.is_empty());

        let (keys, ops) = keys_and_operations(None);
        assert!(keys.is_empty());
        assert!(ops.is_empty());
    }

    #[test]
    fn test_keys_and_operations_escaped_colon() {
        let (keys, ops) = keys_and_operations("a\\:b:set");
        assert_eq!(keys, vec!["a:b"]);
        assert_eq!(ops, vec!["set"]);

        let (keys, ops) = keys_and_operations("a\\:b");
        assert_eq!(keys, vec!["a:b"]);
        assert!(ops.is_empty());
    }

    #[test]
    fn test_parse_path_shapes() {
        assert_eq!(
            parse_path("a.b"),
            vec![PathStep::Key("a".into()), PathStep::Key("b".into())]
        );
        assert_eq!(
            parse_path("a[0][1]"),
            vec![
                PathStep::Key("a".into()),
                PathStep::Index(0),
                PathStep::Index(1)
            ]
        );
        assert_eq!(
            parse_path("a[].b"),
            vec![
                PathStep::Key("a".into()),
                PathStep::Any,
                PathStep::Key("b".into())
            ]
        );
        assert_eq!(
            parse_path("a.(calc)"),
            vec![PathStep::Key("a".into()), PathStep::Call("calc".into())]
        );
        assert_eq!(
            parse_path("a.fn()"),
            vec![PathStep::Key("a".into()), PathStep::Call("fn".into())]
        );
        assert_eq!(
            parse_path("a[x]"),
            vec![PathStep::Key("a".into()), PathStep::Key("x".into())]
        );
        assert_eq!(parse_path("list.0"), parse_path("list#0"));
    }

    #[test]
    fn test_parse_path_unclosed_bracket_is_key() {
        assert_eq!(
            parse_path("a[0"),
            vec![PathStep::Key("a".into()), PathStep::Key("0".into())]
        );
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("*"), "*");
        assert_eq!(canonical_key(" a . b "), "a.b");
        assert_eq!(canonical_key("a['b']"), "a.b");
        assert_eq!(canonical_key("(total)"), "total()");
        assert_eq!(canonical_key("arr[]"), "arr[]");
    }

    #[test]
    fn test_parent_and_ancestors() {
        assert_eq!(parent_key("a.b.c").unwrap(), "a.b");
        assert_eq!(parent_key(""), Err(PathError::NoParent));
        assert_eq!(ancestors("a.b.c"), vec!["a.b", "a"]);
        assert!(ancestors("").is_empty());
    }

    #[test]
    fn test_common_ancestor() {
        assert_eq!(common_ancestor("arr[0]", "arr[2]"), "arr");
        assert_eq!(common_ancestor("a.b.c", "a.b.d.e"), "a.b");
        assert_eq!(common_ancestor("a", "b"), "");
        assert_eq!(common_ancestor("a.b", "a.b"), "a.b");
    }

    #[test]
    fn test_is_child() {
        assert!(is_child("a", "a.b"));
        assert!(is_child("a", "a[0]"));
        assert!(is_child("", "a"));
        assert!(!is_child("a.b", "a"));
        assert!(!is_child("a", "a"));
        assert!(!is_child("a", "ab"));
    }

    #[test]
    fn test_is_generic() {
        assert!(is_generic("arr[]"));
        assert!(is_generic("a[ ].b"));
        assert!(!is_generic("arr[0]"));
    }

    #[test]
    fn test_is_valid_index() {
        assert!(is_valid_index("0"));
        assert!(is_valid_index("123"));
        assert!(!is_valid_index("-1"));
        assert!(!is_valid_index("1.5"));
        assert!(!is_valid_index("abc"));
        assert!(!is_valid_index(""));
        assert!(!is_valid_index("01"));
    }
}
