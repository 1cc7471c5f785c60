use std::fmt;

/// A parsed expression in the segmentation DSL. An expression is either a
/// literal value or a call to a catalog function, whose arguments are
/// themselves expressions.
///
/// This intentionally has no `Field`, `Array`, `Object`, or `Pipe` variant:
/// the grammar is strict prefix-functional notation (`NAME(arg, arg, ...)`)
/// with no bare identifiers, no collection literals, and no infix or pipe
/// syntax.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Call(FunctionCall),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::display::write_compact(self, f)
    }
}

/// A literal value appearing directly in an expression
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A call to a catalog function, e.g. `EQ(PROFILE("country"), "Taiwan")`
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

impl Expression {
    /// Name of the function at the root of this expression, if it's a call
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::Call(call) => Some(&call.name),
            Self::Literal(_) => None,
        }
    }
}
