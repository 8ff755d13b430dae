//! Validation of listener keys.

use crate::types::WILDCARD;
use crate::util::normalize_key;
use crate::PathError;

/// Validate a listener key.
///
/// The key is normalized first, so stray closing brackets are not reported.
///
/// # Errors
///
/// - [`PathError::UnbalancedBracket`] for an unclosed or nested `[`
/// - [`PathError::EmptySegment`] for `a..b`, a leading or a trailing `.`
/// - [`PathError::GenericNotLast`] when `[]` is followed by more steps;
///   element listeners only ever fire on a trailing `[]`
///
/// # Example
///
/// ```
/// use json_observer_path::validate_key;
///
/// validate_key("").unwrap();
/// validate_key("*").unwrap();
/// validate_key("list[]").unwrap();
/// validate_key("list[].name").unwrap_err();
/// validate_key("list[0").unwrap_err();
/// validate_key("a..b").unwrap_err();
/// ```
pub fn validate_key(key: &str) -> Result<(), PathError> {
    let normalized = normalize_key(key);
    if normalized.is_empty() || normalized == WILDCARD {
        return Ok(());
    }
    let mut open = false;
    for c in normalized.chars() {
        match c {
            '[' if open => {
                return Err(PathError::UnbalancedBracket {
                    key: key.to_string(),
                })
            }
            '[' => open = true,
            ']' => open = false,
            _ => {}
        }
    }
    if open {
        return Err(PathError::UnbalancedBracket {
            key: key.to_string(),
        });
    }
    if normalized
        .split('.')
        .any(|segment| segment.is_empty())
    {
        return Err(PathError::EmptySegment {
            key: key.to_string(),
        });
    }
    if let Some(at) = normalized.find("[]") {
        if at + 2 != normalized.len() {
            return Err(PathError::GenericNotLast {
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_common_shapes() {
        for key in ["a", "a.b", "a[0].b", "[0].b", "a[]", "a.b()", "a.(b)", "fi#fi", "0]"] {
            assert!(validate_key(key).is_ok(), "rejected {key}");
        }
    }

    #[test]
    fn test_validate_rejects_brackets() {
        assert!(matches!(
            validate_key("a[0"),
            Err(PathError::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            validate_key("a[[0]]"),
            Err(PathError::UnbalancedBracket { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_segments() {
        assert!(matches!(
            validate_key("a..b"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            validate_key(".a"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            validate_key("a."),
            Err(PathError::EmptySegment { .. })
        ));
    }

    #[test]
    fn test_validate_generic_index_only_at_the_end() {
        for key in ["list[]", "grid[1][]", "[]", "a.b[ ]"] {
            assert!(validate_key(key).is_ok(), "rejected {key}");
        }
        for key in ["list[].name", "grid[][1]", "a[][]", "[].x"] {
            assert!(
                matches!(validate_key(key), Err(PathError::GenericNotLast { .. })),
                "accepted {key}"
            );
        }
    }
}
