//! `TO_NUMBER`, `TO_BOOLEAN`, `TO_STRING`, per `SPEC_FULL.md` §4.3.

use segment_engine::{RuntimeError, Value};
use segment_macros::function;

use crate::context::EvaluationContext;

/// `null`, `""`, and non-numeric strings fail with a type error;
/// booleans convert to `0`/`1`.
#[function(EvaluationContext)]
pub fn to_number(value: Value) -> Result<f64, RuntimeError> {
    match &value {
        Value::Null => Err(RuntimeError::Type {
            expected: "number",
            actual: "null".into(),
        }),
        Value::String(s) if s.is_empty() => Err(RuntimeError::Type {
            expected: "number",
            actual: "empty string".into(),
        }),
        _ => value.as_f64().ok_or_else(|| RuntimeError::Type {
            expected: "number",
            actual: value.type_name().into(),
        }),
    }
}

#[function(EvaluationContext)]
pub fn to_boolean(value: Value) -> bool {
    value.to_bool()
}

/// `null` stays the sentinel `null` value, not the four-character word.
#[function(EvaluationContext)]
pub fn to_string(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(s),
        other => Value::String(render(&other)),
    }
}

/// Best-effort stringification for non-scalar values. The spec only
/// pins down the `null` case; this just needs to be stable and readable.
fn render(value: &Value) -> String {
    use itertools::Itertools;
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Collection(items) => {
            format!("[{}]", items.iter().map(render).join(", "))
        }
        Value::Map(map) => {
            format!(
                "{{{}}}",
                map.iter()
                    .map(|(key, value)| format!("{key}: {}", render(value)))
                    .join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_number_rejects_null() {
        assert!(to_number_value(Value::Null).is_err());
    }

    #[test]
    fn test_to_number_bool() {
        assert_eq!(to_number_value(Value::Boolean(true)).unwrap(), 1.0);
    }

    fn to_number_value(value: Value) -> Result<f64, RuntimeError> {
        match &value {
            Value::Null => Err(RuntimeError::Type {
                expected: "number",
                actual: "null".into(),
            }),
            Value::String(s) if s.is_empty() => Err(RuntimeError::Type {
                expected: "number",
                actual: "empty string".into(),
            }),
            _ => value.as_f64().ok_or_else(|| RuntimeError::Type {
                expected: "number",
                actual: value.type_name().into(),
            }),
        }
    }
}
