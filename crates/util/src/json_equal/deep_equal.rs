use crate::node::Node;

/// Performs a deep equality check between two value graphs.
///
/// This function compares values recursively:
/// - Numbers compare by numeric value, so `1` equals `1.0`
/// - Arrays compare element by element
/// - Objects compare key by key, regardless of member order
/// - Functions compare by identity
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use json_observer_util::{deep_equal, Node};
///
/// let a = Node::from(json!({"foo": [1, 2, 3]}));
/// let b = Node::from(json!({"foo": [1, 2, 3]}));
/// let c = Node::from(json!({"foo": [1, 2, 4]}));
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Null, Node::Null) => true,
        (Node::Bool(a), Node::Bool(b)) => a == b,
        (Node::Number(a), Node::Number(b)) if a.is_f64() || b.is_f64() => {
            matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x == y)
        }
        (Node::Number(a), Node::Number(b)) => a == b,
        (Node::String(a), Node::String(b)) => a == b,
        (Node::Function(a), Node::Function(b)) => a.ptr_eq(b),

        (Node::Array(arr_a), Node::Array(arr_b)) => {
            if arr_a.len() != arr_b.len() {
                return false;
            }
            arr_a.iter().zip(arr_b.iter()).all(|(x, y)| deep_equal(x, y))
        }

        (Node::Object(obj_a), Node::Object(obj_b)) => {
            if obj_a.len() != obj_b.len() {
                return false;
            }
            for (key, val_a) in obj_a {
                match obj_b.get(key) {
                    Some(val_b) => {
                        if !deep_equal(val_a, val_b) {
                            return false;
                        }
                    }
                    None => return false,
                }
            }
            true
        }

        // Different types are never equal
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn n(value: serde_json::Value) -> Node {
        Node::from(value)
    }

    #[test]
    fn test_primitives() {
        assert!(deep_equal(&n(json!(null)), &n(json!(null))));
        assert!(deep_equal(&n(json!(true)), &n(json!(true))));
        assert!(!deep_equal(&n(json!(true)), &n(json!(false))));
        assert!(deep_equal(&n(json!("a")), &n(json!("a"))));
        assert!(!deep_equal(&n(json!("a")), &n(json!("b"))));
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(deep_equal(&n(json!(1)), &n(json!(1.0))));
        assert!(deep_equal(&n(json!(-3)), &n(json!(-3))));
        assert!(!deep_equal(&n(json!(1)), &n(json!(2))));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let a = n(json!(9_007_199_254_740_992u64));
        let b = n(json!(9_007_199_254_740_993u64));
        assert!(!deep_equal(&a, &b));
        assert!(deep_equal(&b, &n(json!(9_007_199_254_740_993u64))));
        assert!(!deep_equal(&n(json!(i64::MIN)), &n(json!(i64::MIN + 1))));
        assert!(deep_equal(&n(json!(2.5)), &n(json!(2.5))));
    }

    #[test]
    fn test_different_types() {
        assert!(!deep_equal(&n(json!(0)), &n(json!(false))));
        assert!(!deep_equal(&n(json!("1")), &n(json!(1))));
        assert!(!deep_equal(&n(json!([])), &n(json!({}))));
        assert!(!deep_equal(&n(json!(null)), &Node::function(|_| Node::Null)));
    }

    #[test]
    fn test_arrays() {
        assert!(deep_equal(&n(json!([1, [2, 3]])), &n(json!([1, [2, 3]]))));
        assert!(!deep_equal(&n(json!([1, 2])), &n(json!([2, 1]))));
        assert!(!deep_equal(&n(json!([1, 2])), &n(json!([1, 2, 3]))));
    }

    #[test]
    fn test_objects_ignore_member_order() {
        assert!(deep_equal(&n(json!({"a": 1, "b": 2})), &n(json!({"b": 2, "a": 1}))));
        assert!(!deep_equal(&n(json!({"a": 1})), &n(json!({"a": 1, "b": 2}))));
        assert!(!deep_equal(&n(json!({"a": 1})), &n(json!({"b": 1}))));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let f = Node::function(|_| Node::Null);
        let g = Node::function(|_| Node::Null);
        assert!(deep_equal(&f, &f.clone()));
        assert!(!deep_equal(&f, &g));
    }
}
