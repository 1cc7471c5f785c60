//! `EVENTS`, `VISITS`, and the field-access functions `PROFILE`/`EVENT`/
//! `PARAM`/`VISIT`, per `SPEC_FULL.md` §4.3 and §9 (zero-arg collection
//! accessors added to supplement the distilled grammar).

use segment_engine::{Context, Value};
use segment_macros::function;

use crate::{context::EvaluationContext, field_access};

#[function(EvaluationContext)]
pub fn events(#[context] ctx: &EvaluationContext) -> Value {
    Value::Collection(ctx.events())
}

#[function(EvaluationContext)]
pub fn visits(#[context] ctx: &EvaluationContext) -> Value {
    Value::Collection(ctx.visits())
}

#[function(EvaluationContext)]
pub fn profile(#[context] ctx: &EvaluationContext, key: String) -> Value {
    field_access::lookup(ctx.profile(), &key)
}

#[function(EvaluationContext)]
pub fn event(#[context] ctx: &EvaluationContext, key: String) -> Value {
    field_access::lookup(&ctx.current_event(), &key)
}

/// Looks up `key` within the current event's `parameters` map.
#[function(EvaluationContext)]
pub fn param(#[context] ctx: &EvaluationContext, key: String) -> Value {
    let parameters = field_access::lookup(&ctx.current_event(), "parameters");
    field_access::lookup(&parameters, &key)
}

#[function(EvaluationContext)]
pub fn visit(#[context] ctx: &EvaluationContext, key: String) -> Value {
    field_access::lookup(&ctx.current_visit(), &key)
}
