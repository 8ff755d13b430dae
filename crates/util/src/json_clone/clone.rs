use crate::node::{Node, Object};

/// Creates a deep clone of a value graph.
///
/// Every nested array and object is copied. Functions are not carried over:
/// each [`Node::Function`] is replaced by [`Node::Null`], so a snapshot never
/// shares an accessor with the live graph.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_observer_util::{deep_clone, Node};
///
/// let original = Node::from(json!({"foo": [1, 2, 3]}));
/// let cloned = deep_clone(&original);
///
/// assert_eq!(original, cloned);
/// ```
pub fn deep_clone(node: &Node) -> Node {
    match node {
        Node::Null | Node::Function(_) => Node::Null,
        Node::Bool(b) => Node::Bool(*b),
        Node::Number(n) => Node::Number(n.clone()),
        Node::String(s) => Node::String(s.clone()),
        Node::Array(arr) => Node::Array(arr.iter().map(deep_clone).collect()),
        Node::Object(obj) => {
            let mut new_obj = Object::with_capacity(obj.len());
            for (key, val) in obj {
                new_obj.insert(key.clone(), deep_clone(val));
            }
            Node::Object(new_obj)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_scalars() {
        for value in [json!(null), json!(true), json!(42), json!(1.25), json!("hello")] {
            let node = Node::from(&value);
            assert_eq!(deep_clone(&node), node);
        }
    }

    #[test]
    fn test_clone_nested() {
        let node = Node::from(json!({
            "array": [1, 2, {"nested": true}],
            "object": {"a": "b"},
            "scalar": 42
        }));
        assert_eq!(deep_clone(&node), node);
    }

    #[test]
    fn test_clone_is_deep_for_arrays() {
        let original = Node::from(json!([[1, 2], [3]]));
        let mut cloned = deep_clone(&original);
        cloned.as_array_mut().unwrap()[0]
            .as_array_mut()
            .unwrap()
            .push(Node::from(9));
        assert_eq!(original.to_json(), json!([[1, 2], [3]]));
        assert_eq!(cloned.to_json(), json!([[1, 2, 9], [3]]));
    }

    #[test]
    fn test_clone_is_deep_for_objects() {
        let original = Node::from(json!({"a": {"b": 1}}));
        let mut cloned = deep_clone(&original);
        cloned.as_object_mut().unwrap()["a"]
            .as_object_mut()
            .unwrap()
            .insert("b".into(), Node::from(2));
        assert_eq!(original.to_json(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_clone_replaces_functions_with_null() {
        let mut obj = Object::new();
        obj.insert("name".into(), Node::from("x"));
        obj.insert("calc".into(), Node::function(|_| Node::from(1)));
        let original = Node::Array(vec![Node::Object(obj), Node::function(|_| Node::Null)]);

        let cloned = deep_clone(&original);
        assert_eq!(cloned.to_json(), json!([{"name": "x", "calc": null}, null]));
        assert!(cloned.as_array().unwrap()[1].is_null());
        assert!(!cloned.as_array().unwrap()[0].as_object().unwrap()["calc"].is_function());
    }
}
