use crate::{context::Context, error::RuntimeError, value::Arguments, value::Value};
use std::collections::HashMap;

/// A native implementation of a catalog function: reduce arguments have
/// already been popped from [Arguments] by the time this runs.
pub type NativeFn<Ctx> =
    for<'ctx> fn(Arguments<'ctx, Ctx>) -> Result<Value, RuntimeError>;

/// Metadata about one catalog entry, per §3's function descriptor: name,
/// arity bounds, and (for non-special-forms) a native implementation.
///
/// Special forms (`AND`, `OR`, `NOT`, `IF`, `WHERE`, `BY`, `FROM`, `TO`) are
/// registered with `native: None` — their behavior bypasses ordinary
/// post-order argument reduction entirely and is implemented directly in
/// `segment_engine::eval`, which matches on the name before consulting this
/// table. They still need an entry here so the parser/validator can enforce
/// their arity (§4.1 step 5) the same way as any other function.
#[derive(Clone)]
pub struct FunctionDescriptor<Ctx: Context> {
    pub name: &'static str,
    pub min_arity: usize,
    pub max_arity: Option<usize>,
    pub native: Option<NativeFn<Ctx>>,
}

/// The frozen function catalog. Registration after construction is
/// forbidden by the type: [Catalog::builder] returns a [CatalogBuilder],
/// and [CatalogBuilder::build] consumes it into an immutable [Catalog].
pub struct Catalog<Ctx: Context> {
    functions: HashMap<&'static str, FunctionDescriptor<Ctx>>,
}

impl<Ctx: Context> Catalog<Ctx> {
    pub fn builder() -> CatalogBuilder<Ctx> {
        CatalogBuilder {
            functions: HashMap::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor<Ctx>> {
        self.functions.get(name)
    }

    /// All registered names, for building "did you mean" suggestions
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

/// Builder for a [Catalog]. Registration is only possible before [build] is
/// called, after which the catalog is sealed (invariant: "registration
/// after sealing is forbidden").
pub struct CatalogBuilder<Ctx: Context> {
    functions: HashMap<&'static str, FunctionDescriptor<Ctx>>,
}

impl<Ctx: Context> CatalogBuilder<Ctx> {
    /// Register a native function implementation
    #[must_use]
    pub fn function(
        mut self,
        name: &'static str,
        min_arity: usize,
        max_arity: Option<usize>,
        native: NativeFn<Ctx>,
    ) -> Self {
        self.functions.insert(
            name,
            FunctionDescriptor {
                name,
                min_arity,
                max_arity,
                native: Some(native),
            },
        );
        self
    }

    /// Register a special form (no native impl; dispatched by name inside
    /// `segment_engine::eval`), purely so the validator can check its arity.
    #[must_use]
    pub fn special_form(
        mut self,
        name: &'static str,
        min_arity: usize,
        max_arity: Option<usize>,
    ) -> Self {
        self.functions.insert(
            name,
            FunctionDescriptor {
                name,
                min_arity,
                max_arity,
                native: None,
            },
        );
        self
    }

    pub fn build(self) -> Catalog<Ctx> {
        Catalog {
            functions: self.functions,
        }
    }
}

/// Names recognized as special forms by `segment_engine::eval`, i.e. the
/// operators in §4.3 whose argument handling deviates from ordinary
/// post-order reduction. Exposed here so `CatalogBuilder` users (and tests)
/// have a single source of truth for which names must not be given a native
/// implementation.
pub const SPECIAL_FORMS: &[&str] =
    &["AND", "OR", "NOT", "IF", "WHERE", "BY", "FROM", "TO"];

pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}
