//! Variable values.
//!
//! Strata variables hold strings, booleans, or lists. The kind matters only
//! for `+`/`+=` compatibility: strings join strings, lists join lists, and
//! booleans join nothing.

use serde::Serialize;
use std::fmt;

/// The value of a variable or module property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Bool(bool),
    List(Vec<Value>),
}

/// Operands of `+` or `+=` whose kinds do not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindMismatch {
    pub left: &'static str,
    pub right: &'static str,
}

impl Value {
    /// The kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
        }
    }

    /// Concatenate two values with `+`.
    pub fn concat(left: &Value, right: &Value) -> Result<Value, KindMismatch> {
        match (left, right) {
            (Value::String(a), Value::String(b)) => {
                let mut s = a.clone();
                s.push_str(b);
                Ok(Value::String(s))
            }
            (Value::List(a), Value::List(b)) => {
                let mut list = a.clone();
                list.extend(b.iter().cloned());
                Ok(Value::List(list))
            }
            _ => Err(KindMismatch {
                left: left.kind_name(),
                right: right.kind_name(),
            }),
        }
    }

    /// Accumulate `other` into this value with `+=`.
    pub fn append(&mut self, other: &Value) -> Result<(), KindMismatch> {
        match (&mut *self, other) {
            (Value::String(a), Value::String(b)) => {
                a.push_str(b);
                Ok(())
            }
            (Value::List(a), Value::List(b)) => {
                a.extend(b.iter().cloned());
                Ok(())
            }
            (left, right) => Err(KindMismatch {
                left: left.kind_name(),
                right: right.kind_name(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
