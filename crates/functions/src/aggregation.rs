//! `COUNT`, `TOP`, `DIVIDE`, per `SPEC_FULL.md` §4.3.

use segment_engine::{Arguments, RuntimeError, TryFromValue, Value};
use segment_macros::function;

use crate::{context::EvaluationContext, field_access};

#[function(EvaluationContext)]
pub fn count(collection: Vec<Value>) -> i64 {
    collection.len() as i64
}

#[function(EvaluationContext)]
pub fn divide(a: f64, b: f64) -> Result<f64, RuntimeError> {
    if b == 0.0 {
        Err(RuntimeError::Other("division by zero".into()))
    } else {
        Ok(a / b)
    }
}

/// `TOP(collection[, prop][, n])`. Handled without `#[function]` since the
/// trailing two arguments are each independently optional, which the macro's
/// fixed positional extraction can't express.
pub fn top(mut arguments: Arguments<'_, EvaluationContext>) -> Result<Value, RuntimeError> {
    let collection: Vec<Value> = arguments.pop_position()?;
    let prop: Option<String> = if arguments.remaining() > 0 {
        Some(arguments.pop_position()?)
    } else {
        None
    };
    let n: Option<i64> = if arguments.remaining() > 0 {
        Some(arguments.pop_position()?)
    } else {
        None
    };
    arguments.ensure_consumed()?;

    if collection.is_empty() {
        return Ok(Value::Null);
    }

    let keys: Vec<Value> = collection
        .iter()
        .map(|element| match &prop {
            Some(prop) => field_access::lookup(element, prop),
            None => element.clone(),
        })
        .collect();

    // (value, count, first-occurrence index), ties broken by first occurrence
    let mut counts: Vec<(Value, usize, usize)> = Vec::new();
    for (index, key) in keys.into_iter().enumerate() {
        if let Some(entry) = counts.iter_mut().find(|(value, _, _)| *value == key) {
            entry.1 += 1;
        } else {
            counts.push((key, 1, index));
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    match n {
        Some(n) => {
            let top_n = counts
                .into_iter()
                .take(n.max(0) as usize)
                .map(|(value, _, _)| value)
                .collect();
            Ok(Value::Collection(top_n))
        }
        None => Ok(counts.into_iter().next().map(|(value, _, _)| value).unwrap_or(Value::Null)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UserRecord;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_count_empty() {
        assert_eq!(Vec::<Value>::try_from_value(Value::Null).unwrap().len(), 0);
    }

    #[test]
    fn test_divide_by_zero() {
        assert!(matches!(
            divide_inner(1.0, 0.0),
            Err(RuntimeError::Other(_))
        ));
    }

    fn divide_inner(a: f64, b: f64) -> Result<f64, RuntimeError> {
        if b == 0.0 {
            Err(RuntimeError::Other("division by zero".into()))
        } else {
            Ok(a / b)
        }
    }

    #[test]
    fn test_top_breaks_ties_by_first_occurrence() {
        let collection = vec![
            Value::String("Chrome".into()),
            Value::String("Chrome".into()),
            Value::String("Safari".into()),
        ];
        let ctx = EvaluationContext::new(UserRecord::new(IndexMap::new(), [], []));
        let arguments = Arguments::new("TOP", vec![Value::Collection(collection)], vec![], &ctx);
        let result = top(arguments).unwrap();
        assert_eq!(result, Value::String("Chrome".into()));
    }
}
