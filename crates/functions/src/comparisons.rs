//! `EQ`/`NEQ`/`GT`/`GTE`/`LT`/`LTE`, per the type coercion rules in
//! `SPEC_FULL.md` §4.3.

use segment_engine::{RuntimeError, Value};
use segment_macros::function;

use crate::context::EvaluationContext;

#[function(EvaluationContext)]
pub fn eq(a: Value, b: Value) -> bool {
    values_equal(&a, &b)
}

#[function(EvaluationContext)]
pub fn neq(a: Value, b: Value) -> bool {
    !values_equal(&a, &b)
}

/// Cross-type equality: `null == null` is true, `null` vs. anything else is
/// false, numbers compare numerically (`10 == 10.0`), strings compare
/// byte-for-byte, and a number is never equal to a non-numeric string (no
/// implicit parsing).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        _ if a.is_numeric() || b.is_numeric() => {
            match (a.is_numeric(), b.is_numeric()) {
                (true, true) => a.as_f64() == b.as_f64(),
                // a number against a non-numeric string/bool/collection never matches
                _ => false,
            }
        }
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Collection(a), Value::Collection(b)) => a == b,
        (Value::Map(a), Value::Map(b)) => a == b,
        _ => false,
    }
}

#[function(EvaluationContext)]
pub fn gt(a: Value, b: Value) -> Result<bool, RuntimeError> {
    Ok(numeric(&a)? > numeric(&b)?)
}

#[function(EvaluationContext)]
pub fn gte(a: Value, b: Value) -> Result<bool, RuntimeError> {
    Ok(numeric(&a)? >= numeric(&b)?)
}

#[function(EvaluationContext)]
pub fn lt(a: Value, b: Value) -> Result<bool, RuntimeError> {
    Ok(numeric(&a)? < numeric(&b)?)
}

#[function(EvaluationContext)]
pub fn lte(a: Value, b: Value) -> Result<bool, RuntimeError> {
    Ok(numeric(&a)? <= numeric(&b)?)
}

fn numeric(value: &Value) -> Result<f64, RuntimeError> {
    value.as_f64().ok_or_else(|| RuntimeError::NotANumber {
        value: format!("{value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_equality() {
        assert!(values_equal(&Value::Null, &Value::Null));
        assert!(!values_equal(&Value::Null, &Value::Integer(0)));
    }

    #[test]
    fn test_cross_numeric_equality() {
        assert!(values_equal(&Value::Integer(10), &Value::Float(10.0)));
    }

    #[test]
    fn test_number_vs_non_numeric_string() {
        assert!(!values_equal(&Value::Integer(10), &Value::String("ten".into())));
    }

    #[test]
    fn test_numeric_rejects_non_numeric_string() {
        assert!(numeric(&Value::String("abc".into())).is_err());
    }
}
