//! Nested-map ingestion for user records, per §6: "Input may be delivered as
//! a typed record or as a nested map". Accepts a JSON object shaped like
//! `{ "profile": {...}, "visits": [...], "events": [...] }`.

use indexmap::IndexMap;
use segment_engine::Value;
use segment_functions::UserRecord;

pub fn user_record_from_json(json: &serde_json::Value) -> UserRecord {
    let profile = json.get("profile").map(to_index_map).unwrap_or_default();
    let visits = json
        .get("visits")
        .and_then(serde_json::Value::as_array)
        .into_iter()
        .flatten()
        .map(to_index_map)
        .collect::<Vec<_>>();
    let events = json
        .get("events")
        .and_then(serde_json::Value::as_array)
        .into_iter()
        .flatten()
        .map(to_index_map)
        .collect::<Vec<_>>();
    UserRecord::new(profile, visits, events)
}

fn to_index_map(json: &serde_json::Value) -> IndexMap<String, Value> {
    match json_to_value(json) {
        Value::Map(map) => map,
        _ => IndexMap::new(),
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or_default())),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Collection(items.iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(key, value)| (key.clone(), json_to_value(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_ingest_profile_and_events() {
        let json = json!({
            "profile": {"country": "Taiwan", "age": 25},
            "events": [{"eventName": "purchase", "timestamp": "2024-01-01T00:00:00Z"}],
        });
        let record = user_record_from_json(&json);
        assert_eq!(
            record.profile(),
            &Value::Map(
                [
                    ("country".to_string(), Value::String("Taiwan".into())),
                    ("age".to_string(), Value::Integer(25)),
                ]
                .into_iter()
                .collect()
            )
        );
        assert_eq!(record.events().len(), 1);
    }

    #[test]
    fn test_ingest_missing_sections_default_empty() {
        let record = user_record_from_json(&json!({}));
        assert_eq!(record.events().len(), 0);
        assert_eq!(record.visits().len(), 0);
    }
}
