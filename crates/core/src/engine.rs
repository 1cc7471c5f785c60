//! The facade wrapping a compiler and the built-in catalog: `evaluate`,
//! `evaluate_batch`, `clear_cache`, `cache_size` from §6, and the batch
//! driver from §4.4.

use crate::error::{ErrorKind, EvaluationResult};
use segment_engine::{CacheConfig, CompileError, Compiler, ParseError};
use segment_functions::{EvaluationContext, UserRecord};
use segment_util::ResultTraced;
use std::time::Instant;
use tracing::debug_span;

/// Owns the frozen catalog and the shared compile cache. Cheap to share: the
/// catalog is read-only and the cache is internally synchronized, so an
/// `Engine` is typically constructed once and used from many threads.
pub struct Engine {
    compiler: Compiler<EvaluationContext>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            compiler: Compiler::new(segment_functions::catalog()),
        }
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            compiler: Compiler::with_config(segment_functions::catalog(), config),
        }
    }

    /// Evaluate `expression` against one user record (§6: `evaluate`).
    pub fn evaluate(&self, expression: &str, record: UserRecord) -> EvaluationResult {
        let _span = debug_span!("evaluate", expression).entered();
        let start = Instant::now();

        let compiled = match self.compiler.compile(expression).traced() {
            Ok(compiled) => compiled,
            Err(err) => {
                return EvaluationResult::failure(
                    expression,
                    classify_compile_error(&err),
                    err.to_string(),
                    start.elapsed(),
                );
            }
        };

        let ctx = EvaluationContext::new(record);
        match self.compiler.execute(&compiled, &ctx).traced() {
            Ok(value) => EvaluationResult::success(expression, value, start.elapsed()),
            Err(err) => EvaluationResult::failure(
                expression,
                ErrorKind::RuntimeError,
                err.to_string(),
                start.elapsed(),
            ),
        }
    }

    /// Evaluate `expression` against each of `records`, per §4.4: parse and
    /// compile once; a shared parse/compile failure yields one identical
    /// failure result per user (no user silently skipped); per-user runtime
    /// errors are isolated from each other.
    pub fn evaluate_batch(
        &self,
        expression: &str,
        records: Vec<UserRecord>,
    ) -> Vec<EvaluationResult> {
        let _span = debug_span!("evaluate_batch", expression, count = records.len()).entered();
        let start = Instant::now();

        let compiled = match self.compiler.compile(expression).traced() {
            Ok(compiled) => compiled,
            Err(err) => {
                let kind = classify_compile_error(&err);
                let message = err.to_string();
                return records
                    .iter()
                    .map(|_| {
                        EvaluationResult::failure(
                            expression,
                            kind,
                            message.clone(),
                            start.elapsed(),
                        )
                    })
                    .collect();
            }
        };

        records
            .into_iter()
            .map(|record| {
                let item_start = Instant::now();
                let ctx = EvaluationContext::new(record);
                match self.compiler.execute(&compiled, &ctx) {
                    Ok(value) => EvaluationResult::success(expression, value, item_start.elapsed()),
                    Err(err) => EvaluationResult::failure(
                        expression,
                        ErrorKind::RuntimeError,
                        err.to_string(),
                        item_start.elapsed(),
                    ),
                }
            })
            .collect()
    }

    pub fn clear_cache(&self) {
        self.compiler.clear_cache();
    }

    pub fn cache_size(&self) -> usize {
        self.compiler.cache_size()
    }
}

fn classify_compile_error(err: &CompileError) -> ErrorKind {
    match err {
        CompileError::Parse(ParseError::Internal { .. }) => ErrorKind::CompilationError,
        CompileError::Parse(_) => ErrorKind::SyntaxError,
        CompileError::Internal(_) => ErrorKind::CompilationError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use segment_engine::Value;

    fn profile_record(country: &str, age: i64) -> UserRecord {
        let mut profile = IndexMap::new();
        profile.insert("country".to_string(), Value::String(country.to_string()));
        profile.insert("age".to_string(), Value::Integer(age));
        UserRecord::new(profile, [], [])
    }

    #[test]
    fn test_evaluate_success() {
        let engine = Engine::new();
        let result = engine.evaluate(
            r#"EQ(PROFILE("country"), "Taiwan")"#,
            profile_record("Taiwan", 25),
        );
        assert!(result.success);
        assert_eq!(result.value, Some(Value::Boolean(true)));
    }

    #[test]
    fn test_evaluate_syntax_error() {
        let engine = Engine::new();
        let result = engine.evaluate("GT(count(events), 5)", profile_record("Taiwan", 25));
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::SyntaxError));
        assert!(result.error_message.unwrap().contains("COUNT"));
    }

    #[test]
    fn test_evaluate_arity_error() {
        let engine = Engine::new();
        let result = engine.evaluate("AND(true)", profile_record("Taiwan", 25));
        assert!(!result.success);
        assert!(result.error_message.unwrap().contains("expects 2.."));
    }

    #[test]
    fn test_batch_equivalence() {
        let engine = Engine::new();
        let expression = r#"EQ(PROFILE("country"),"TW")"#;
        let records = vec![
            profile_record("TW", 1),
            profile_record("US", 1),
            profile_record("TW", 1),
        ];
        let batch = engine.evaluate_batch(expression, records.clone());
        let individual: Vec<_> = records
            .into_iter()
            .map(|record| engine.evaluate(expression, record))
            .collect();
        for (a, b) in batch.iter().zip(individual.iter()) {
            assert_eq!(a.value, b.value);
            assert_eq!(a.success, b.success);
        }
    }

    #[test]
    fn test_batch_shares_one_parse_failure_per_user() {
        let engine = Engine::new();
        let records = vec![profile_record("TW", 1), profile_record("US", 1)];
        let results = engine.evaluate_batch("AND(true)", records);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success));
    }

    #[test]
    fn test_cache_transparency() {
        let engine = Engine::new();
        let expression = r#"EQ(PROFILE("country"), "Taiwan")"#;
        let before = engine.evaluate(expression, profile_record("Taiwan", 25));
        engine.clear_cache();
        let after = engine.evaluate(expression, profile_record("Taiwan", 25));
        assert_eq!(before.value, after.value);
    }
}
