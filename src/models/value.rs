// Typed attribute values and normalized records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::ResourceHandle;

/// Field name -> value, ordered by field name.
pub type Attributes = BTreeMap<String, Value>;

/// A resource's attributes after normalization. Same key set for every record of a class.
pub type NormalizedRecord = Attributes;

/// One attribute value as read from the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Int(i64),
    Str(String),
    /// Symbolic constant (state names, booleans, module names).
    Atom(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Handle(ResourceHandle),
}

impl Value {
    pub fn atom(s: impl Into<String>) -> Self {
        Value::Atom(s.into())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// String or atom contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Atom(s) => Some(s),
            _ => None,
        }
    }

    /// Printed form, used for display, search and textual sorting.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) | Value::Atom(s) => f.write_str(s),
            Value::Tuple(items) => write_seq(f, "{", items, "}"),
            Value::List(items) => write_seq(f, "[", items, "]"),
            Value::Handle(h) => write!(f, "{}", h),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Atom(if b { "true" } else { "false" }.to_string())
    }
}

impl From<ResourceHandle> for Value {
    fn from(h: ResourceHandle) -> Self {
        Value::Handle(h)
    }
}
