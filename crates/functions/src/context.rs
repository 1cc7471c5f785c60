//! The concrete user record and evaluation context, and the dispatch target
//! for every function in this crate's catalog.

use indexmap::IndexMap;
use segment_engine::{Context, ELEMENT_KIND_KEY, TimeRange, Value};
use std::sync::Arc;

/// One user's segmentation data, per `SPEC_FULL.md` §3: a profile, an
/// id-keyed map of visits, and an ordered sequence of events.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRecord {
    profile: Value,
    visits: Vec<Value>,
    events: Vec<Value>,
}

impl UserRecord {
    /// Build a record from plain maps, tagging each visit/event with the
    /// `__kind__` marker that `WHERE`/`IF` use to decide which context field
    /// a collection element belongs in (see [segment_engine::ElementKind]).
    pub fn new(
        profile: IndexMap<String, Value>,
        visits: impl IntoIterator<Item = IndexMap<String, Value>>,
        events: impl IntoIterator<Item = IndexMap<String, Value>>,
    ) -> Self {
        Self {
            profile: Value::Map(profile),
            visits: visits.into_iter().map(|v| tag(v, "visit")).collect(),
            events: events.into_iter().map(|v| tag(v, "event")).collect(),
        }
    }

    pub fn profile(&self) -> &Value {
        &self.profile
    }

    pub fn visits(&self) -> &[Value] {
        &self.visits
    }

    pub fn events(&self) -> &[Value] {
        &self.events
    }
}

fn tag(mut map: IndexMap<String, Value>, kind: &str) -> Value {
    map.insert(ELEMENT_KIND_KEY.to_string(), Value::String(kind.to_string()));
    Value::Map(map)
}

/// The `Context` implementation evaluated expressions run against. Wraps a
/// shared [UserRecord] plus the mutable-by-derivation fields
/// (`currentEvent`/`currentVisit`/`timeRange`) that `WHERE`/`IF`/`FROM`/`TO`
/// thread through iteration.
#[derive(Clone)]
pub struct EvaluationContext {
    record: Arc<UserRecord>,
    current_event: Value,
    current_visit: Value,
    time_range: Option<TimeRange>,
}

impl EvaluationContext {
    pub fn new(record: UserRecord) -> Self {
        Self {
            record: Arc::new(record),
            current_event: Value::Null,
            current_visit: Value::Null,
            time_range: None,
        }
    }

    pub fn profile(&self) -> &Value {
        self.record.profile()
    }
}

impl Context for EvaluationContext {
    fn events(&self) -> Vec<Value> {
        self.record.events().to_vec()
    }

    fn visits(&self) -> Vec<Value> {
        self.record.visits().to_vec()
    }

    fn current_event(&self) -> Value {
        self.current_event.clone()
    }

    fn current_visit(&self) -> Value {
        self.current_visit.clone()
    }

    fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    fn with_current_event(&self, event: Value) -> Self {
        Self {
            current_event: event,
            ..self.clone()
        }
    }

    fn with_current_visit(&self, visit: Value) -> Self {
        Self {
            current_visit: visit,
            ..self.clone()
        }
    }

    fn with_time_from(&self, from_epoch_ms: i64) -> Self {
        let mut range = self.time_range.unwrap_or(TimeRange { from: None, to: None });
        range.from = Some(from_epoch_ms);
        Self {
            time_range: Some(range),
            ..self.clone()
        }
    }

    fn with_time_to(&self, to_epoch_ms: i64) -> Self {
        let mut range = self.time_range.unwrap_or(TimeRange { from: None, to: None });
        range.to = Some(to_epoch_ms);
        Self {
            time_range: Some(range),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tagging() {
        let mut event = IndexMap::new();
        event.insert("eventName".to_string(), Value::String("purchase".into()));
        let record = UserRecord::new(IndexMap::new(), [], [event]);
        let ctx = EvaluationContext::new(record);
        let events = ctx.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].element_kind(), segment_engine::ElementKind::Event);
    }
}
