//! Public result/error shapes, per `SPEC_FULL.md` §6/§7: errors are values,
//! never exceptions, across this crate's boundary.

use segment_engine::Value;

/// The five-kind taxonomy from §7. `ValidationError` is reserved for future
/// semantic checks the core doesn't perform yet; `DataError` is folded into
/// `RuntimeError` at this implementer's discretion, per §7's explicit
/// allowance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, derive_more::Display)]
pub enum ErrorKind {
    #[display("SYNTAX_ERROR")]
    SyntaxError,
    #[display("VALIDATION_ERROR")]
    ValidationError,
    #[display("COMPILATION_ERROR")]
    CompilationError,
    #[display("RUNTIME_ERROR")]
    RuntimeError,
    #[display("DATA_ERROR")]
    DataError,
}

/// The result of one `evaluate`/`evaluate_batch` call, per §6: `{ success,
/// value?, errorKind?, errorMessage?, elapsedMs, expression }`.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
    pub success: bool,
    pub value: Option<Value>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub elapsed_ms: u64,
    pub expression: String,
}

impl EvaluationResult {
    pub(crate) fn success(expression: &str, value: Value, elapsed: std::time::Duration) -> Self {
        Self {
            success: true,
            value: Some(value),
            error_kind: None,
            error_message: None,
            elapsed_ms: elapsed.as_millis() as u64,
            expression: expression.to_string(),
        }
    }

    pub(crate) fn failure(
        expression: &str,
        error_kind: ErrorKind,
        error_message: String,
        elapsed: std::time::Duration,
    ) -> Self {
        Self {
            success: false,
            value: None,
            error_kind: Some(error_kind),
            error_message: Some(error_message),
            elapsed_ms: elapsed.as_millis() as u64,
            expression: expression.to_string(),
        }
    }
}
