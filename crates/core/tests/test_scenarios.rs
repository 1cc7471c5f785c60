//! End-to-end scenarios against a full `Engine`: one purchase-count
//! predicate, one `TOP` aggregate, one profile-age check, two parse
//! failures, and one batch-equivalence check.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use segment_core::{Engine, ErrorKind, UserRecord, Value};

fn event(name: &str) -> IndexMap<String, Value> {
    let mut map = IndexMap::new();
    map.insert("eventName".to_string(), Value::String(name.to_string()));
    map
}

fn visit(browser: &str) -> IndexMap<String, Value> {
    let mut map = IndexMap::new();
    map.insert("browser".to_string(), Value::String(browser.to_string()));
    map
}

#[test]
fn test_purchase_count_scenario() {
    let engine = Engine::new();
    let record = UserRecord::new(
        IndexMap::new(),
        [],
        [event("purchase"), event("purchase"), event("purchase"), event("click")],
    );
    let result = engine.evaluate(
        r#"GT(COUNT(IF("EQ(EVENT(\"event_name\"), \"purchase\")")), 2)"#,
        record,
    );
    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.value, Some(Value::Boolean(true)));
}

#[test]
fn test_top_browser_scenario() {
    let engine = Engine::new();
    let record = UserRecord::new(
        IndexMap::new(),
        [visit("Chrome"), visit("Chrome"), visit("Safari")],
        [],
    );
    let result = engine.evaluate(r#"TOP(VISITS(), "browser")"#, record);
    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.value, Some(Value::String("Chrome".into())));
}

#[test]
fn test_profile_age_and_country_scenario() {
    let engine = Engine::new();
    let mut profile = IndexMap::new();
    profile.insert("birthday".to_string(), Value::String("1990-01-01".into()));
    profile.insert("country".to_string(), Value::String("Taiwan".into()));
    profile.insert("age".to_string(), Value::Integer(34));
    let record = UserRecord::new(profile, [], []);
    let result = engine.evaluate(
        r#"AND(GTE(PROFILE("age"), 18), EQ(PROFILE("country"), "Taiwan"))"#,
        record,
    );
    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.value, Some(Value::Boolean(true)));
}

#[test]
fn test_lowercase_function_name_suggests_uppercase() {
    let engine = Engine::new();
    let result = engine.evaluate("GT(count(events), 5)", UserRecord::new(IndexMap::new(), [], []));
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::SyntaxError));
    let message = result.error_message.unwrap();
    assert!(message.contains("COUNT"));
}

#[test]
fn test_and_with_one_argument_reports_arity() {
    let engine = Engine::new();
    let result = engine.evaluate("AND(true)", UserRecord::new(IndexMap::new(), [], []));
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ErrorKind::SyntaxError));
    assert!(result
        .error_message
        .unwrap()
        .contains("AND expects 2.. arguments, got 1"));
}

#[test]
fn test_batch_equivalence_scenario() {
    let engine = Engine::new();
    let mut tw_profile = IndexMap::new();
    tw_profile.insert("country".to_string(), Value::String("TW".into()));
    let mut us_profile = IndexMap::new();
    us_profile.insert("country".to_string(), Value::String("US".into()));

    let records = vec![
        UserRecord::new(tw_profile.clone(), [], []),
        UserRecord::new(us_profile, [], []),
        UserRecord::new(tw_profile, [], []),
    ];
    let results = engine.evaluate_batch(r#"EQ(PROFILE("country"),"TW")"#, records);
    let values: Vec<_> = results.into_iter().map(|r| r.value).collect();
    assert_eq!(
        values,
        vec![
            Some(Value::Boolean(true)),
            Some(Value::Boolean(false)),
            Some(Value::Boolean(true)),
        ]
    );
}
