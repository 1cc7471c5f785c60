//! Compact and expanded pretty-printing, per `SPEC_FULL.md` §4.1. Both modes
//! are semantic no-ops: re-parsing the output must yield the same
//! validation verdict and, once compiled, an observationally equivalent
//! program. String-literal contents are preserved byte-for-byte.

use crate::expression::{Expression, FunctionCall, Literal};
use std::fmt;

/// Render `expr` in compact form: no whitespace beyond what's required to
/// separate tokens.
pub fn compact(expr: &Expression) -> String {
    let mut out = String::new();
    write_compact(expr, &mut Writer(&mut out)).expect("writing to String cannot fail");
    out
}

pub(crate) fn write_compact(
    expr: &Expression,
    f: &mut impl fmt::Write,
) -> fmt::Result {
    match expr {
        Expression::Literal(literal) => write_literal(literal, f),
        Expression::Call(call) => {
            write!(f, "{}(", call.name)?;
            for (i, arg) in call.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_compact(arg, f)?;
            }
            write!(f, ")")
        }
    }
}

/// Render `expr` in expanded form: each argument on its own line, indented
/// by `indent_size` spaces per nesting level, with the closing delimiter
/// aligned to the opening call.
pub fn expanded(expr: &Expression, indent_size: usize) -> String {
    let mut out = String::new();
    write_expanded(expr, 0, indent_size, &mut out);
    out
}

fn write_expanded(expr: &Expression, depth: usize, indent_size: usize, out: &mut String) {
    match expr {
        Expression::Literal(literal) => {
            let mut buf = String::new();
            write_literal(literal, &mut buf).expect("writing to String cannot fail");
            out.push_str(&buf);
        }
        Expression::Call(call) => {
            out.push_str(&call.name);
            out.push('(');
            if call.args.is_empty() {
                out.push(')');
                return;
            }
            out.push('\n');
            let inner_indent = " ".repeat((depth + 1) * indent_size);
            for (i, arg) in call.args.iter().enumerate() {
                out.push_str(&inner_indent);
                write_expanded(arg, depth + 1, indent_size, out);
                if i + 1 < call.args.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&" ".repeat(depth * indent_size));
            out.push(')');
        }
    }
}

fn write_literal(literal: &Literal, f: &mut impl fmt::Write) -> fmt::Result {
    match literal {
        Literal::Null => write!(f, "null"),
        Literal::Boolean(b) => write!(f, "{b}"),
        Literal::Integer(n) => write!(f, "{n}"),
        Literal::Float(n) => write!(f, "{n}"),
        Literal::String(s) => {
            write!(f, "\"")?;
            for c in s.chars() {
                match c {
                    '"' => write!(f, "\\\"")?,
                    '\\' => write!(f, "\\\\")?,
                    '\n' => write!(f, "\\n")?,
                    '\t' => write!(f, "\\t")?,
                    '\r' => write!(f, "\\r")?,
                    other => write!(f, "{other}")?,
                }
            }
            write!(f, "\"")
        }
    }
}

/// Adapter so `write_compact` can take a plain `&mut String` or a
/// `fmt::Formatter` interchangeably
struct Writer<'a>(&'a mut String);

impl fmt::Write for Writer<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s)
    }
}
