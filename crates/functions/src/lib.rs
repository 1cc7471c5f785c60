//! The built-in function catalog: comparisons, conversions, aggregation,
//! field access, and the concrete [EvaluationContext] they all dispatch
//! against. `segment_engine` knows nothing about any of this — it only knows
//! about the special forms (`AND`/`OR`/`NOT`/`IF`/`WHERE`/`BY`/`FROM`/`TO`).

mod aggregation;
mod collections;
mod comparisons;
mod context;
mod conversions;
mod field_access;

pub use context::{EvaluationContext, UserRecord};

use segment_engine::{Catalog, SPECIAL_FORMS, special_form_arity};

/// Build the frozen catalog of every built-in function plus the special
/// forms (registered arity-only; their behavior lives in
/// `segment_engine::eval`).
pub fn catalog() -> Catalog<EvaluationContext> {
    let mut builder = Catalog::builder();
    for name in SPECIAL_FORMS {
        let (min, max) = special_form_arity(name)
            .unwrap_or_else(|| panic!("special form `{name}` has no registered arity"));
        builder = builder.special_form(name, min, max);
    }
    builder
        .function("EQ", 2, Some(2), comparisons::eq)
        .function("NEQ", 2, Some(2), comparisons::neq)
        .function("GT", 2, Some(2), comparisons::gt)
        .function("GTE", 2, Some(2), comparisons::gte)
        .function("LT", 2, Some(2), comparisons::lt)
        .function("LTE", 2, Some(2), comparisons::lte)
        .function("TO_NUMBER", 1, Some(1), conversions::to_number)
        .function("TO_BOOLEAN", 1, Some(1), conversions::to_boolean)
        .function("TO_STRING", 1, Some(1), conversions::to_string)
        .function("COUNT", 1, Some(1), aggregation::count)
        .function("DIVIDE", 2, Some(2), aggregation::divide)
        .function("TOP", 1, Some(3), aggregation::top)
        .function("EVENTS", 0, Some(0), collections::events)
        .function("VISITS", 0, Some(0), collections::visits)
        .function("PROFILE", 1, Some(1), collections::profile)
        .function("EVENT", 1, Some(1), collections::event)
        .function("PARAM", 1, Some(1), collections::param)
        .function("VISIT", 1, Some(1), collections::visit)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_registers_special_forms_and_functions() {
        let catalog = catalog();
        assert!(catalog.contains("AND"));
        assert!(catalog.contains("WHERE"));
        assert!(catalog.contains("EQ"));
        assert!(catalog.contains("TOP"));
        assert!(!catalog.contains("NOT_A_FUNCTION"));
    }
}
