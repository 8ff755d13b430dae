use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::rc::Rc;

/// Object members, in insertion order.
pub type Object = IndexMap<String, Node>;

/// A zero-argument accessor stored inside the value graph.
///
/// The accessor is invoked with its receiver, the container that holds it,
/// when a path reads through it (`total()` or `(total)`). Two accessors are
/// equal only if they are the same allocation.
#[derive(Clone)]
pub struct Accessor(Rc<dyn Fn(&Node) -> Node>);

impl Accessor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Node) -> Node + 'static,
    {
        Self(Rc::new(f))
    }

    pub fn call(&self, receiver: &Node) -> Node {
        (self.0)(receiver)
    }

    pub fn ptr_eq(&self, other: &Accessor) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// A node of an observed value graph.
///
/// This is the JSON data model extended with [`Node::Function`], the same way
/// a binary-aware JSON value extends it with a byte-array variant.
///
/// # Round-Trip Warning
///
/// Converting to [`serde_json::Value`] renders functions as `null`, so
/// `Node -> Value -> Node` does not preserve accessors.
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(Object),
    Function(Accessor),
}

impl Node {
    /// An empty object.
    pub fn object() -> Self {
        Node::Object(Object::new())
    }

    /// An empty array.
    pub fn array() -> Self {
        Node::Array(Vec::new())
    }

    /// Wraps an accessor closure.
    ///
    /// # Example
    ///
    /// ```
    /// use json_observer_util::Node;
    ///
    /// let f = Node::function(|_| Node::from(42));
    /// assert!(f.is_function());
    /// ```
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Node) -> Node + 'static,
    {
        Node::Function(Accessor::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Node::Function(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_accessor(&self) -> Option<&Accessor> {
        match self {
            Node::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Function(_) => "function",
        }
    }

    /// Converts to a JSON value. Functions become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Null | Node::Function(_) => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(arr) => Value::Array(arr.iter().map(Node::to_json).collect()),
            Node::Object(obj) => {
                let mut map = Map::new();
                for (key, val) in obj {
                    map.insert(key.clone(), val.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        crate::json_equal::deep_equal(self, other)
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(arr) => Node::Array(arr.iter().map(Node::from).collect()),
            Value::Object(obj) => {
                let mut map = Object::with_capacity(obj.len());
                for (key, val) in obj {
                    map.insert(key.clone(), Node::from(val));
                }
                Node::Object(map)
            }
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from(&value)
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        node.to_json()
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Node::Number(n.into())
    }
}

impl From<u64> for Node {
    fn from(n: u64) -> Self {
        Node::Number(n.into())
    }
}

impl From<usize> for Node {
    fn from(n: usize) -> Self {
        Node::Number((n as u64).into())
    }
}

impl From<f64> for Node {
    /// Non-finite floats have no JSON representation and become `null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Node::Number).unwrap_or(Node::Null)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(arr: Vec<Node>) -> Self {
        Node::Array(arr)
    }
}

impl From<Object> for Node {
    fn from(obj: Object) -> Self {
        Node::Object(obj)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
