//! The post-order dispatcher described in `SPEC_FULL.md` §4.3, with the
//! documented special forms layered on top: short-circuit combinators
//! (`AND`/`OR`/`NOT`), string-literal-as-code iteration operators
//! (`IF`/`WHERE`), the unreduced-argument operator (`BY`), and the
//! context-mutating time window operators (`FROM`/`TO`).

use crate::{
    compiler::Compiler,
    context::Context,
    error::{MaxArity, RuntimeError},
    expression::{Expression, FunctionCall, Literal},
    time::parse_timestamp_ms,
    value::{Arguments, ElementKind, Value},
};
use tracing::warn;

/// Evaluate a compiled expression tree against a context. `compiler` is
/// needed only by `WHERE`/`IF`, which must recompile their predicate
/// argument (passed as a string literal) — see §4.3.
pub fn evaluate<Ctx: Context>(
    expr: &Expression,
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    match expr {
        Expression::Literal(literal) => Ok(literal_value(literal)),
        Expression::Call(call) => evaluate_call(call, ctx, compiler),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::String(s) => Value::String(s.clone()),
    }
}

fn evaluate_call<Ctx: Context>(
    call: &FunctionCall,
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    match call.name.as_str() {
        "AND" => eval_and(&call.args, ctx, compiler),
        "OR" => eval_or(&call.args, ctx, compiler),
        "NOT" => eval_not(&call.args, ctx, compiler),
        "IF" => eval_if(&call.args, ctx, compiler),
        "WHERE" => eval_where(&call.args, ctx, compiler),
        "BY" => eval_by(&call.args, ctx, compiler),
        "FROM" | "TO" => {
            // Used outside WHERE/IF's trailing-argument position: evaluate
            // the timestamp argument and return it, but there is no
            // enclosing iteration to install a bound into.
            let value = evaluate(&call.args[0], ctx, compiler)?;
            Ok(value)
        }
        name => {
            let values = call
                .args
                .iter()
                .map(|arg| evaluate(arg, ctx, compiler))
                .collect::<Result<Vec<_>, _>>()?;
            let raw = call.args.clone();
            let catalog = compiler.catalog();
            let descriptor = catalog
                .get(name)
                .ok_or_else(|| RuntimeError::UnknownFunction { name: name.into() })?;
            let native = descriptor.native.ok_or_else(|| RuntimeError::UnknownFunction {
                name: name.into(),
            })?;
            let arguments = Arguments::new(descriptor.name, values, raw, ctx);
            native(arguments)
        }
    }
}

/// `AND(a, b, ...)` — left-to-right, stop at the first `false`
fn eval_and<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    for arg in args {
        if !evaluate(arg, ctx, compiler)?.to_bool() {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

/// `OR(a, b, ...)` — left-to-right, stop at the first `true`
fn eval_or<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    for arg in args {
        if evaluate(arg, ctx, compiler)?.to_bool() {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn eval_not<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    let value = evaluate(&args[0], ctx, compiler)?;
    Ok(Value::Boolean(!value.to_bool()))
}

/// Split trailing `FROM(t)`/`TO(t)` arguments off an iteration operator's
/// argument list, evaluating them to extend `ctx`'s time range. Returns the
/// remaining (non-time-window) arguments and the effective context.
fn apply_time_window<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<(Vec<Expression>, Ctx), RuntimeError> {
    let mut effective = ctx.clone();
    let mut rest = Vec::new();
    for arg in args {
        match arg {
            Expression::Call(call) if call.name == "FROM" => {
                let value = evaluate(&call.args[0], ctx, compiler)?;
                let ms = timestamp_value_to_ms(&value)?;
                effective = effective.with_time_from(ms);
            }
            Expression::Call(call) if call.name == "TO" => {
                let value = evaluate(&call.args[0], ctx, compiler)?;
                let ms = timestamp_value_to_ms(&value)?;
                effective = effective.with_time_to(ms);
            }
            other => rest.push(other.clone()),
        }
    }
    Ok((rest, effective))
}

fn timestamp_value_to_ms(value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::String(s) => parse_timestamp_ms(s),
        Value::Integer(n) => Ok(*n),
        other => Err(RuntimeError::InvalidTimestamp {
            value: format!("{other:?}"),
        }),
    }
}

/// `IF(predicate[, FROM(t)][, TO(t)])` is sugar for
/// `WHERE(EVENTS(), predicate[, FROM(t)][, TO(t)])`
fn eval_if<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    let mut where_args = vec![Expression::Call(FunctionCall {
        name: "EVENTS".into(),
        args: vec![],
    })];
    where_args.extend_from_slice(args);
    eval_where(&where_args, ctx, compiler)
}

/// `WHERE(collection, predicate[, FROM(t)][, TO(t)])`
fn eval_where<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    let (args, effective_ctx) = apply_time_window(args, ctx, compiler)?;
    // `FROM`/`TO` are stripped above, so a validated call that supplied
    // fewer than 2 non-time-window arguments (e.g. `WHERE(EVENTS(),
    // FROM(t))`) would otherwise index out of bounds below.
    if args.len() < 2 {
        return Err(RuntimeError::Arity {
            function: "WHERE".into(),
            min: 2,
            max: MaxArity(Some(2)),
            actual: args.len(),
        });
    }
    let collection_value = evaluate(&args[0], ctx, compiler)?;
    let predicate_text = match &args[1] {
        Expression::Literal(Literal::String(s)) => s.clone(),
        other => {
            // Fall back to evaluating it if it wasn't written as a literal;
            // the text must still coerce to a string.
            evaluate(other, ctx, compiler)?
                .to_string_lossy()
                .ok_or_else(|| RuntimeError::Type {
                    expected: "string",
                    actual: "non-string predicate".into(),
                })?
        }
    };
    let compiled_predicate = compiler.compile(&predicate_text).map_err(|err| {
        RuntimeError::Other(format!("failed to compile predicate: {err}"))
    })?;

    let time_range = effective_ctx.time_range();
    let elements = match collection_value {
        Value::Collection(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(RuntimeError::Type {
                expected: "collection",
                actual: other.type_name().into(),
            });
        }
    };

    let mut output = Vec::new();
    for element in elements {
        if let Some(range) = &time_range {
            if element.element_kind() == ElementKind::Event {
                if let Some(timestamp) = element.event_timestamp_ms() {
                    if !range.contains(timestamp) {
                        continue;
                    }
                }
            }
        }

        let child_ctx = match element.element_kind() {
            ElementKind::Event => effective_ctx.with_current_event(element.clone()),
            ElementKind::Visit => effective_ctx.with_current_visit(element.clone()),
            ElementKind::Other => effective_ctx.clone(),
        };

        match compiler.execute(&compiled_predicate, &child_ctx) {
            Ok(value) if value.to_bool() => output.push(element),
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "element-level predicate error swallowed");
            }
        }
    }
    Ok(Value::Collection(output))
}

/// `BY(expr)` — re-evaluates its unreduced argument once per event
fn eval_by<Ctx: Context>(
    args: &[Expression],
    ctx: &Ctx,
    compiler: &Compiler<Ctx>,
) -> Result<Value, RuntimeError> {
    let expr = &args[0];
    let mut output = Vec::new();
    for event in ctx.events() {
        let child_ctx = ctx.with_current_event(event);
        let value = evaluate(expr, &child_ctx, compiler).unwrap_or(Value::Null);
        output.push(value);
    }
    Ok(Value::Collection(output))
}

impl Value {
    /// Best-effort string coercion used only by `WHERE`'s fallback path
    /// when a predicate argument wasn't written as a literal
    fn to_string_lossy(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Arity metadata for the special forms, used when building a [crate::catalog::Catalog]
pub fn special_form_arity(name: &str) -> Option<(usize, Option<usize>)> {
    match name {
        "AND" | "OR" => Some((2, None)),
        "NOT" => Some((1, Some(1))),
        "IF" => Some((1, Some(3))),
        "WHERE" => Some((2, Some(4))),
        "BY" => Some((1, Some(1))),
        "FROM" | "TO" => Some((1, Some(1))),
        _ => None,
    }
}
