use crate::{
    context::Context,
    error::{MaxArity, RuntimeError},
    expression::Expression,
};
use indexmap::IndexMap;
use std::collections::VecDeque;

/// A runtime value produced by evaluating an expression. Corresponds to the
/// value domain reachable from the DSL: the literal kinds plus the
/// collection/map shapes produced by field access and iteration operators.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// An ordered sequence, e.g. the output of `WHERE`/`IF`, or `userData.events`
    Collection(Vec<Value>),
    /// A string-keyed map, e.g. an event's `parameters`, or a nested profile
    /// field. Ordered because `OrderedMap`/`OrderedSequence` are part of the
    /// public data model (§3).
    Map(IndexMap<String, Value>),
}

impl Value {
    /// `TO_BOOLEAN` truthiness, per `SPEC_FULL.md` §4.3:
    /// - `null` → false
    /// - numbers: nonzero → true
    /// - strings: empty → false; case-insensitive `false`/`no`/`0` → false;
    ///   case-insensitive `true`/`yes`/`1` → true; any other non-empty → true
    /// - collections: non-empty → true
    /// - maps: always true
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => {
                if s.is_empty() {
                    false
                } else {
                    match s.to_lowercase().as_str() {
                        "false" | "no" | "0" => false,
                        "true" | "yes" | "1" => true,
                        _ => true,
                    }
                }
            }
            Value::Collection(items) => !items.is_empty(),
            Value::Map(_) => true,
        }
    }

    /// Coerce to a 64-bit float for numeric comparison, per §4.3. Returns
    /// `None` for values with no sensible numeric interpretation (used by
    /// comparison functions to decide whether to fall back to other rules).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// True if this is a numeric value (integer or float), used by `EQ`'s
    /// cross-type rule: "a number and a non-numeric string are never equal".
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// What kind of user-record element this value was tagged as, if any.
    /// `WHERE`/`IF` use this to decide whether a child context gets
    /// `currentEvent` or `currentVisit` set, and whether time-window
    /// filtering applies (`SPEC_FULL.md` §9, design note 3). Tagging is done
    /// by reserving the `__kind__` key in a [Value::Map], set by the
    /// `EVENTS()`/`VISITS()` catalog functions when they build their output.
    pub fn element_kind(&self) -> ElementKind {
        match self {
            Value::Map(map) => match map.get(ELEMENT_KIND_KEY) {
                Some(Value::String(s)) if s == "event" => ElementKind::Event,
                Some(Value::String(s)) if s == "visit" => ElementKind::Visit,
                _ => ElementKind::Other,
            },
            _ => ElementKind::Other,
        }
    }

    /// `timestamp` field of an event-tagged map, parsed to epoch
    /// milliseconds, if this is an event and the field parses.
    pub fn event_timestamp_ms(&self) -> Option<i64> {
        match self {
            Value::Map(map) if self.element_kind() == ElementKind::Event => {
                match map.get("timestamp") {
                    Some(Value::String(s)) => crate::time::parse_timestamp_ms(s).ok(),
                    Some(Value::Integer(n)) => Some(*n),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Collection(_) => "collection",
            Value::Map(_) => "map",
        }
    }
}

/// Reserved map key used to tag values produced by `EVENTS()`/`VISITS()`
pub const ELEMENT_KIND_KEY: &str = "__kind__";

/// What a [Value] represents in terms of the user-record shape from §3
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Event,
    Visit,
    Other,
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Collection(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

/// Conversion from a runtime [Value] into a typed function argument. Mirrors
/// the teacher's `TryFromValue`, trimmed to the value kinds this grammar can
/// actually produce.
pub trait TryFromValue: Sized {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError>;
}

impl TryFromValue for Value {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        Ok(value)
    }
}

impl TryFromValue for bool {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        Ok(value.to_bool())
    }
}

impl TryFromValue for String {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(RuntimeError::Type {
                expected: "string",
                actual: other.type_name().into(),
            }),
        }
    }
}

impl TryFromValue for f64 {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        value.as_f64().ok_or_else(|| RuntimeError::NotANumber {
            value: format!("{value:?}"),
        })
    }
}

impl TryFromValue for i64 {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Integer(n) => Ok(n),
            Value::Float(n) => Ok(n as i64),
            other => Err(RuntimeError::Type {
                expected: "number",
                actual: other.type_name().into(),
            }),
        }
    }
}

impl TryFromValue for Vec<Value> {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Collection(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(RuntimeError::Type {
                expected: "collection",
                actual: other.type_name().into(),
            }),
        }
    }
}

impl<T: TryFromValue> TryFromValue for Option<T> {
    fn try_from_value(value: Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Null => Ok(None),
            other => T::try_from_value(other).map(Some),
        }
    }
}

/// Conversion from a function's native return type into the catalog's
/// `Result<Value, RuntimeError>` convention. This lets leaf functions return
/// plain `bool`/`f64`/`Option<T>`/etc. instead of manually wrapping in `Ok`.
pub trait FunctionOutput {
    fn into_result(self) -> Result<Value, RuntimeError>;
}

impl<T: Into<Value>> FunctionOutput for T {
    fn into_result(self) -> Result<Value, RuntimeError> {
        Ok(self.into())
    }
}

impl<T: Into<Value>> FunctionOutput for Result<T, RuntimeError> {
    fn into_result(self) -> Result<Value, RuntimeError> {
        self.map(Into::into)
    }
}

/// The argument list passed to a catalog function's implementation, after
/// the dispatcher has reduced each argument expression to a [Value] (or, for
/// special-form operators, left it unreduced). Positional only — the grammar
/// has no keyword arguments.
pub struct Arguments<'ctx, Ctx: Context> {
    function_name: &'static str,
    values: VecDeque<Value>,
    raw: VecDeque<Expression>,
    context: &'ctx Ctx,
}

impl<'ctx, Ctx: Context> Arguments<'ctx, Ctx> {
    pub fn new(
        function_name: &'static str,
        values: Vec<Value>,
        raw: Vec<Expression>,
        context: &'ctx Ctx,
    ) -> Self {
        Self {
            function_name,
            values: values.into(),
            raw: raw.into(),
            context,
        }
    }

    /// Pop the next positional argument and convert it via [TryFromValue]
    pub fn pop_position<T: TryFromValue>(&mut self) -> Result<T, RuntimeError> {
        self.raw.pop_front();
        let value = self.values.pop_front().ok_or_else(|| self.arity_error())?;
        T::try_from_value(value)
    }

    /// Pop the next positional argument's unreduced expression, without
    /// evaluating it. Used by `BY`, which must re-evaluate its argument once
    /// per iteration element against a derived context.
    pub fn pop_position_raw(&mut self) -> Result<Expression, RuntimeError> {
        self.values.pop_front();
        self.raw.pop_front().ok_or_else(|| self.arity_error())
    }

    /// Access the evaluation context
    pub fn context(&self) -> &'ctx Ctx {
        self.context
    }

    /// Number of positional arguments not yet popped. Used by variadic
    /// functions like `TOP` to distinguish "trailing optional argument
    /// omitted" from "argument present".
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Assert no arguments remain unconsumed
    pub fn ensure_consumed(&self) -> Result<(), RuntimeError> {
        if self.values.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::TooManyArguments {
                function: self.function_name.into(),
            })
        }
    }

    fn arity_error(&self) -> RuntimeError {
        RuntimeError::Arity {
            function: self.function_name.into(),
            min: 0,
            max: MaxArity(None),
            actual: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::null(Value::Null, false)]
    #[case::zero_int(Value::Integer(0), false)]
    #[case::nonzero_int(Value::Integer(5), true)]
    #[case::zero_float(Value::Float(0.0), false)]
    #[case::empty_string(Value::String(String::new()), false)]
    #[case::false_string(Value::String("false".into()), false)]
    #[case::no_string(Value::String("NO".into()), false)]
    #[case::zero_string(Value::String("0".into()), false)]
    #[case::true_string(Value::String("true".into()), true)]
    #[case::yes_string(Value::String("YES".into()), true)]
    #[case::one_string(Value::String("1".into()), true)]
    #[case::other_string(Value::String("hello".into()), true)]
    #[case::empty_collection(Value::Collection(vec![]), false)]
    #[case::nonempty_collection(Value::Collection(vec![Value::Null]), true)]
    fn test_to_bool(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.to_bool(), expected);
    }

    #[test]
    fn test_cross_type_numeric_equality() {
        let int_val = Value::Integer(10);
        let float_val = Value::Float(10.0);
        assert_eq!(int_val.as_f64(), float_val.as_f64());
    }

    #[test]
    fn test_non_numeric_string_has_no_numeric_value() {
        assert_eq!(Value::String("hello".into()).as_f64(), None);
    }
}
