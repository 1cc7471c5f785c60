use std::fmt;
use thiserror::Error;

/// A failure from one of the four validation stages run before parsing
/// succeeds, per the fixed-order pipeline: empty check, case check,
/// delimiter balance, undefined-function check, arity check.
///
/// `Display` is implemented by hand rather than via `#[error(...)]` because
/// several variants render a conditional suggestion suffix.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    Empty,
    BadCase {
        name: String,
        position: usize,
        suggestion: Option<String>,
    },
    UnclosedDelimiter {
        opener: char,
        opener_position: usize,
    },
    UnexpectedCloser {
        closer: char,
        position: usize,
    },
    MismatchedDelimiter {
        opener: char,
        opener_position: usize,
        closer: char,
        closer_position: usize,
    },
    UnknownFunction {
        name: String,
        position: usize,
        suggestion: Option<String>,
    },
    BadArity {
        name: String,
        position: usize,
        min: usize,
        max: Option<usize>,
        actual: usize,
    },
    Internal {
        position: usize,
        message: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "expression is empty"),
            Self::BadCase {
                name, suggestion, ..
            } => {
                write!(f, "function name `{name}` must be uppercase")?;
                write_suggestion(f, suggestion)
            }
            Self::UnclosedDelimiter {
                opener,
                opener_position,
            } => write!(f, "unmatched `{opener}` at position {opener_position}"),
            Self::UnexpectedCloser { closer, position } => {
                write!(f, "unexpected closing `{closer}` at position {position}")
            }
            Self::MismatchedDelimiter {
                opener,
                opener_position,
                closer,
                closer_position,
            } => write!(
                f,
                "mismatched delimiters: `{opener}` at {opener_position} \
                 closed by `{closer}` at {closer_position}"
            ),
            Self::UnknownFunction {
                name, suggestion, ..
            } => {
                write!(f, "unknown function `{name}`")?;
                write_suggestion(f, suggestion)
            }
            Self::BadArity {
                name, min, max, actual, ..
            } => {
                write!(f, "{name} expects {min}..")?;
                if let Some(max) = max {
                    write!(f, "{max}")?;
                }
                write!(f, " arguments, got {actual}")
            }
            Self::Internal { position, message } => {
                write!(f, "internal parser error at position {position}: {message}")
            }
        }
    }
}

fn write_suggestion(
    f: &mut fmt::Formatter<'_>,
    suggestion: &Option<String>,
) -> fmt::Result {
    match suggestion {
        Some(name) => write!(f, ", did you mean `{name}`?"),
        None => Ok(()),
    }
}

impl ParseError {
    /// The 0-based code-unit position this error is anchored to, if any
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::BadCase { position, .. }
            | Self::UnknownFunction { position, .. }
            | Self::BadArity { position, .. }
            | Self::Internal { position, .. } => Some(*position),
            Self::UnclosedDelimiter { opener_position, .. } => {
                Some(*opener_position)
            }
            Self::UnexpectedCloser { position, .. } => Some(*position),
            Self::MismatchedDelimiter { opener_position, .. } => {
                Some(*opener_position)
            }
        }
    }

    /// The taxonomy tag used by `SPEC_FULL.md` §4.1
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::BadCase { .. } => "BAD_CASE",
            Self::UnclosedDelimiter { .. }
            | Self::UnexpectedCloser { .. }
            | Self::MismatchedDelimiter { .. } => "UNBALANCED",
            Self::UnknownFunction { .. } => "UNKNOWN_FUNCTION",
            Self::BadArity { .. } => "BAD_ARITY",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

/// A failure compiling an already-validated expression into executable form.
/// Under invariant I2 (the compiler never sees an invalid input), this should
/// only ever be reached if the parser and compiler have drifted out of sync.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("compiler backend rejected a validated expression: {0}")]
    Internal(String),
}

/// A failure during evaluation of a compiled expression against a context.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("expected a {expected} value, got {actual}")]
    Type { expected: &'static str, actual: String },

    #[error("{function} expects {min}..{max} arguments, got {actual}")]
    Arity {
        function: String,
        min: usize,
        /// Pre-rendered so the `#[error(...)]` string can stay a plain
        /// field interpolation; `None` renders as an empty upper bound.
        max: MaxArity,
        actual: usize,
    },

    #[error("{function} received unexpected extra arguments")]
    TooManyArguments { function: String },

    #[error("could not parse `{value}` as a timestamp")]
    InvalidTimestamp { value: String },

    #[error("could not convert `{value}` to a number")]
    NotANumber { value: String },

    #[error("unknown function `{name}` (should be unreachable after validation)")]
    UnknownFunction { name: String },

    #[error("required field `{field}` was missing or null")]
    MissingField { field: String },

    #[error("{0}")]
    Other(String),
}

/// The upper bound of a function's arity, rendered as an empty string when
/// unbounded (variadic) rather than as `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxArity(pub Option<usize>);

impl fmt::Display for MaxArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(max) => write!(f, "{max}"),
            None => Ok(()),
        }
    }
}

impl From<Option<usize>> for MaxArity {
    fn from(max: Option<usize>) -> Self {
        Self(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_arity_message() {
        let err = ParseError::BadArity {
            name: "AND".into(),
            position: 0,
            min: 2,
            max: None,
            actual: 1,
        };
        assert_eq!(err.to_string(), "AND expects 2.. arguments, got 1");
    }

    #[test]
    fn test_unknown_function_suggestion() {
        let err = ParseError::UnknownFunction {
            name: "count".into(),
            position: 3,
            suggestion: Some("COUNT".into()),
        };
        assert!(err.to_string().contains("did you mean `COUNT`?"));
    }
}
