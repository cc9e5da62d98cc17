use std::fmt::Formatter;

use crate::runtime::{RuntimeError, Value};

/// Canonical textual form of a value. Total; `serialize` is the checked
/// variant that refuses the error sentinel.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::NumberValue(n) => write!(f, "{}", n),
            Value::StringValue(s) => write!(f, "\"{}\"", s),
            Value::BoolValue(b) => write!(f, "{}", b),
            Value::PrimitiveValue(_) => write!(f, "#<primop>"),
            Value::ClosureValue(_) => write!(f, "#<procedure>"),
            Value::ErrorValue => write!(f, "#<error>"),
        }
    }
}

pub fn serialize(value: &Value) -> Result<String, RuntimeError> {
    match value {
        Value::ErrorValue => Err(RuntimeError::Unserializable(value.type_name())),
        _ => Ok(value.to_string()),
    }
}
