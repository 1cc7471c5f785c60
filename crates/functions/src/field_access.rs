//! One-level dot-notation field access shared by `PROFILE`, `EVENT`,
//! `PARAM`, `VISIT`, and `TOP`'s `prop` argument. Per `SPEC_FULL.md` §4.3,
//! lookups try the snake-case form first and the camelCase form as a
//! fallback, and never fail: a missing key, a non-map current element, or a
//! type mismatch all just produce `null`.

use indexmap::IndexMap;
use segment_engine::Value;

/// Look up `path` in `value`, supporting exactly one level of dot notation
/// (`"a"` or `"a.b"`, not `"a.b.c"`).
pub fn lookup(value: &Value, path: &str) -> Value {
    let Value::Map(map) = value else {
        return Value::Null;
    };
    let mut parts = path.splitn(2, '.');
    let first = parts.next().unwrap_or_default();
    let Some(found) = lookup_key(map, first) else {
        return Value::Null;
    };
    match parts.next() {
        None => found.clone(),
        Some(rest) => match found {
            Value::Map(inner) => lookup_key(inner, rest).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        },
    }
}

fn lookup_key<'a>(map: &'a IndexMap<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key)
        .or_else(|| map.get(&to_camel_case(key)))
        .or_else(|| map.get(&to_snake_case(key)))
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sample() -> Value {
        let mut inner = IndexMap::new();
        inner.insert("landingPage".to_string(), Value::String("/home".into()));
        let mut map = IndexMap::new();
        map.insert("first_referral".to_string(), Value::String("google".into()));
        map.insert("session".to_string(), Value::Map(inner));
        Value::Map(map)
    }

    #[rstest]
    #[case::exact_snake("first_referral", Value::String("google".into()))]
    #[case::camel_fallback("firstReferral", Value::String("google".into()))]
    #[case::missing("nonexistent", Value::Null)]
    fn test_top_level(#[case] path: &str, #[case] expected: Value) {
        assert_eq!(lookup(&sample(), path), expected);
    }

    #[test]
    fn test_one_level_nested() {
        assert_eq!(
            lookup(&sample(), "session.landing_page"),
            Value::String("/home".into())
        );
    }

    #[test]
    fn test_non_map_value_returns_null() {
        assert_eq!(lookup(&Value::Null, "anything"), Value::Null);
    }
}
