//! Parser, compiler, and evaluator for the segmentation expression language.
//!
//! This crate has no notion of what a user record actually contains, or what
//! functions exist beyond the special forms (`AND`/`OR`/`NOT`/`IF`/`WHERE`/
//! `BY`/`FROM`/`TO`). The concrete catalog lives in `segment_functions`; the
//! concrete [Context] implementation and public evaluation API live in
//! `segment_core`.

mod catalog;
mod compiler;
mod context;
mod display;
mod error;
mod eval;
mod expression;
mod parse;
mod time;
mod value;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, CatalogBuilder, FunctionDescriptor, NativeFn, SPECIAL_FORMS, is_special_form};
pub use compiler::{CacheConfig, CompiledExpression, Compiler};
pub use context::{Context, TimeRange};
pub use display::{compact, expanded};
pub use error::{CompileError, MaxArity, ParseError, RuntimeError};
pub use eval::{evaluate, special_form_arity};
pub use expression::{Expression, FunctionCall, Literal};
pub use parse::validate;
pub use time::parse_timestamp_ms;
pub use value::{Arguments, ELEMENT_KIND_KEY, ElementKind, FunctionOutput, TryFromValue, Value};
