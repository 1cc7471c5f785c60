use crate::value::Value;

/// The read-only environment a compiled expression executes against.
///
/// Unlike the teacher's `async` `Context` trait, this is entirely
/// synchronous: per `SPEC_FULL.md` §5, evaluation is CPU-bound and has no
/// suspension points. Implementors (`segment_core::EvaluationContext`) own
/// the `userData`/`currentEvent`/`currentVisit`/`timeRange` fields from §3;
/// this trait exposes only what generic dispatch (special forms in
/// `segment_engine::eval`) needs to read or derive them. Domain-specific
/// field lookups (`PROFILE`, `EVENT`, `PARAM`, `VISIT`) are ordinary catalog
/// functions in `segment_functions` that take `#[context]` and call back
/// into this same trait — they do not need extra methods here.
///
/// Per design note "hidden context coupling" (`SPEC_FULL.md` §9), there is
/// no `__compiler__` entry point on this trait: operators that need to
/// recompile a string-literal predicate receive an explicit `&Compiler`
/// argument from the evaluator instead (see `eval::evaluate`).
pub trait Context: Clone {
    /// `userData.events`, as an ordered collection of event values. Each
    /// element's [ElementKind] (see [Value::element_kind]) is `Event`.
    fn events(&self) -> Vec<Value>;

    /// `userData.visits`, as an ordered collection of visit values. Each
    /// element's [ElementKind] is `Visit`.
    fn visits(&self) -> Vec<Value>;

    /// `currentEvent`, or `Value::Null` outside of event iteration
    fn current_event(&self) -> Value;

    /// `currentVisit`, or `Value::Null` outside of visit iteration
    fn current_visit(&self) -> Value;

    /// `timeRange`, inclusive-exclusive bounds in epoch milliseconds
    fn time_range(&self) -> Option<TimeRange>;

    /// Derive a child context with `currentEvent` set to `event`. The
    /// receiver is left unmodified (§5: "the parent is never mutated").
    #[must_use]
    fn with_current_event(&self, event: Value) -> Self;

    /// Derive a child context with `currentVisit` set to `visit`
    #[must_use]
    fn with_current_visit(&self, visit: Value) -> Self;

    /// Derive a context with `timeRange.from` set, for `FROM(t)`
    #[must_use]
    fn with_time_from(&self, from_epoch_ms: i64) -> Self;

    /// Derive a context with `timeRange.to` set, for `TO(t)`
    #[must_use]
    fn with_time_to(&self, to_epoch_ms: i64) -> Self;
}

/// An inclusive-exclusive window of epoch-millisecond timestamps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl TimeRange {
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        self.from.is_none_or(|from| timestamp_ms >= from)
            && self.to.is_none_or(|to| timestamp_ms < to)
    }
}
