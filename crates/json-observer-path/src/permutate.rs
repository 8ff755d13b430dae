use crate::types::Permutation;
use crate::util::{is_valid_index, normalize_key};

/// Computes the cascade checkpoints of a concrete key.
///
/// Every bracketed index crossed on the way to the end of the key yields one
/// [`Permutation`], outermost array first. Only the index of the checkpoint
/// itself is made generic; indices further out stay concrete.
///
/// # Example
///
/// ```
/// use json_observer_path::permutate_key;
///
/// let chain = permutate_key("v1.v2.arr[0].v3.arr[1]");
/// assert_eq!(chain.len(), 2);
/// assert_eq!(chain[0].specific, "v1.v2.arr[0]");
/// assert_eq!(chain[0].generic, "v1.v2.arr[]");
/// assert_eq!(chain[0].index, 0);
/// assert_eq!(chain[1].specific, "v1.v2.arr[0].v3.arr[1]");
/// assert_eq!(chain[1].generic, "v1.v2.arr[0].v3.arr[]");
/// assert_eq!(chain[1].index, 1);
///
/// assert!(permutate_key("").is_empty());
/// ```
pub fn permutate_key(key: &str) -> Vec<Permutation> {
    let key = normalize_key(key);
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(open) = key[from..].find('[').map(|i| i + from) {
        let Some(close) = key[open..].find(']').map(|i| i + open) else {
            break;
        };
        let inner = &key[open + 1..close];
        if is_valid_index(inner) {
            if let Ok(index) = inner.parse() {
                out.push(Permutation {
                    specific: key[..=close].to_string(),
                    generic: format!("{}[]", &key[..open]),
                    index,
                });
            }
        }
        from = close + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutate_without_arrays() {
        assert!(permutate_key("a.b.c").is_empty());
    }

    #[test]
    fn test_permutate_root_array() {
        let chain = permutate_key("[3].name");
        assert_eq!(
            chain,
            vec![Permutation {
                specific: "[3]".into(),
                generic: "[]".into(),
                index: 3,
            }]
        );
    }

    #[test]
    fn test_permutate_multi_dimensional() {
        let chain = permutate_key("grid[1][2]");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].generic, "grid[]");
        assert_eq!(chain[1].specific, "grid[1][2]");
        assert_eq!(chain[1].generic, "grid[1][]");
        assert_eq!(chain[1].index, 2);
    }

    #[test]
    fn test_permutate_skips_generic_and_named_brackets() {
        let chain = permutate_key("a[].b['x'].c[4]");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].index, 4);
        assert_eq!(chain[0].generic, "a[].b['x'].c[]");
    }
}
