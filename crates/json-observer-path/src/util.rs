use crate::types::{Path, PathStep, WILDCARD};
use crate::PathError;

/// Normalizes a raw key string.
///
/// All whitespace is removed, `#` separators become `.`, and any `]` that
/// has no opening `[` is dropped. Keys assembled by string concatenation
/// (`"0]"`, `"fi#fi"`) end up in their canonical dotted form.
///
/// # Example
///
/// ```
/// use json_observer_path::normalize_key;
///
/// assert_eq!(normalize_key("fi.fi.   fum"), "fi.fi.fum");
/// assert_eq!(normalize_key("fi#fi"), "fi.fi");
/// assert_eq!(normalize_key("0]"), "0");
/// assert_eq!(normalize_key("arr[ 2 ]"), "arr[2]");
/// ```
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            c if c.is_whitespace() => {}
            '#' => out.push('.'),
            '[' => {
                depth += 1;
                out.push('[');
            }
            ']' => {
                if depth > 0 {
                    depth -= 1;
                    out.push(']');
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Splits a key spec of the form `"key1, key2:op1, op2"`.
///
/// The split happens on the first `:` that is not escaped with a backslash.
/// Passing `None` yields two empty lists, an empty spec yields a single empty
/// key.
///
/// # Example
///
/// ```
/// use json_observer_path::keys_and_operations;
///
/// let (keys, ops) = keys_and_operations("key1, key2:operation1, operation2");
/// assert_eq!(keys, vec!["key1", "key2"]);
/// assert_eq!(ops, vec!["operation1", "operation2"]);
///
/// let (keys, ops) = keys_and_operations(":operation");
/// assert_eq!(keys, vec![""]);
/// assert_eq!(ops, vec!["operation"]);
///
/// let (keys, ops) = keys_and_operations(None);
/// assert!(keys.is_empty() && ops.is_empty());
/// ```
pub fn keys_and_operations<'a>(spec: impl Into<Option<&'a str>>) -> (Vec<String>, Vec<String>) {
    let Some(spec) = spec.into() else {
        return (Vec::new(), Vec::new());
    };
    match split_unescaped(spec, ':') {
        Some((keys, operations)) => (split_list(&unescape(keys)), split_list(operations)),
        None => (split_list(&unescape(spec)), Vec::new()),
    }
}

fn split_unescaped(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if c == sep && !escaped {
            return Some((&s[..i], &s[i + c.len_utf8()..]));
        }
        escaped = c == '\\' && !escaped;
    }
    None
}

fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }
    s.replace("\\:", ":")
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(|part| part.trim().to_string()).collect()
}

/// Parses a key path into typed steps.
///
/// The key is normalized first. Bracket contents that are not a valid index
/// become [`PathStep::Key`], empty brackets become [`PathStep::Any`], and both
/// `name()` and `(name)` become [`PathStep::Call`].
///
/// # Example
///
/// ```
/// use json_observer_path::{parse_path, PathStep};
///
/// assert_eq!(
///     parse_path("list[2].total()"),
///     vec![
///         PathStep::Key("list".into()),
///         PathStep::Index(2),
///         PathStep::Call("total".into()),
///     ]
/// );
/// assert_eq!(parse_path(""), vec![]);
/// ```
pub fn parse_path(key: &str) -> Path {
    let key = normalize_key(key);
    let mut steps = Vec::new();
    let mut segment = String::new();
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        match c {
            '.' => flush_segment(&mut segment, &mut steps),
            '[' => {
                flush_segment(&mut segment, &mut steps);
                let mut inner = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if closed {
                    steps.push(bracket_step(inner));
                } else {
                    segment.push_str(&inner);
                }
            }
            c => segment.push(c),
        }
    }
    flush_segment(&mut segment, &mut steps);
    steps
}

fn bracket_step(inner: String) -> PathStep {
    if inner.is_empty() {
        return PathStep::Any;
    }
    if is_valid_index(&inner) {
        if let Ok(index) = inner.parse() {
            return PathStep::Index(index);
        }
    }
    let unquoted = inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')));
    match unquoted {
        Some(name) => PathStep::Key(name.to_string()),
        None => PathStep::Key(inner),
    }
}

fn flush_segment(segment: &mut String, steps: &mut Path) {
    if segment.is_empty() {
        return;
    }
    let segment = std::mem::take(segment);
    if segment.len() > 2 {
        if let Some(name) = segment.strip_suffix("()") {
            steps.push(PathStep::Call(name.to_string()));
            return;
        }
        if let Some(name) = segment.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            steps.push(PathStep::Call(name.to_string()));
            return;
        }
    }
    steps.push(PathStep::Key(segment));
}

/// Formats steps back into the canonical dotted and bracketed form.
///
/// # Example
///
/// ```
/// use json_observer_path::{format_path, parse_path};
///
/// assert_eq!(format_path(&parse_path("a['b'][3].(c)")), "a.b[3].c()");
/// assert_eq!(format_path(&parse_path("[0].x")), "[0].x");
/// ```
pub fn format_path(steps: &[PathStep]) -> String {
    let mut out = String::new();
    for step in steps {
        if !out.is_empty() && !step.is_bracketed() {
            out.push('.');
        }
        out.push_str(&step.to_string());
    }
    out
}

/// Canonical registry form of a key. The wildcard is kept as is.
pub fn canonical_key(key: &str) -> String {
    let normalized = normalize_key(key);
    if normalized == WILDCARD {
        return normalized;
    }
    format_path(&parse_path(&normalized))
}

/// Drops the last segment of a key.
///
/// # Errors
///
/// Returns [`PathError::NoParent`] for the root (empty) key.
///
/// # Example
///
/// ```
/// use json_observer_path::parent_key;
///
/// assert_eq!(parent_key("a.b[2]").unwrap(), "a.b");
/// assert_eq!(parent_key("a[2]").unwrap(), "a");
/// assert_eq!(parent_key("a").unwrap(), "");
/// assert!(parent_key("").is_err());
/// ```
pub fn parent_key(key: &str) -> Result<String, PathError> {
    let mut steps = parse_path(key);
    if steps.pop().is_none() {
        return Err(PathError::NoParent);
    }
    Ok(format_path(&steps))
}

/// Returns every ancestor of a key, nearest first, excluding the root.
///
/// # Example
///
/// ```
/// use json_observer_path::ancestors;
///
/// assert_eq!(ancestors("v1.arr[0].v2"), vec!["v1.arr[0]", "v1.arr", "v1"]);
/// assert!(ancestors("v1").is_empty());
/// ```
pub fn ancestors(key: &str) -> Vec<String> {
    let mut steps = parse_path(key);
    let mut out = Vec::new();
    while steps.pop().is_some() && !steps.is_empty() {
        out.push(format_path(&steps));
    }
    out
}

/// Deepest key shared by both arguments, at segment granularity.
pub fn common_ancestor(a: &str, b: &str) -> String {
    let a = parse_path(a);
    let b = parse_path(b);
    let shared = a
        .iter()
        .zip(b.iter())
        .take_while(|(x, y)| x == y)
        .count();
    format_path(&a[..shared])
}

/// Check if `parent` strictly contains `child`.
pub fn is_child(parent: &str, child: &str) -> bool {
    let parent = parse_path(parent);
    let child = parse_path(child);
    parent.len() < child.len() && parent.iter().zip(child.iter()).all(|(p, c)| p == c)
}

/// Check if a key contains a generic `[]` index.
pub fn is_generic(key: &str) -> bool {
    normalize_key(key).contains("[]")
}

/// Check if a string represents a valid non-negative integer array index.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}
