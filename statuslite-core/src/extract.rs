//! Metric extraction from arbitrary JSON
//!
//! Picks a small, readable fingerprint out of an unknown API response.
//! Well-known fields are always surfaced; anything else is admitted only
//! while fewer than [`HEURISTIC_CAP`] entries have been collected.

use serde_json::Value;

use crate::model::{MetricValue, Metrics};

/// Keys surfaced regardless of how many entries were already taken (matched lower-cased)
pub const PRIORITY_KEYS: [&str; 12] = [
    "followers",
    "following",
    "public_repos",
    "stars",
    "forks",
    "watchers",
    "version",
    "status",
    "region",
    "latency",
    "uuid",
    "origin",
];

/// Heuristic matches stop once this many entries have been extracted
pub const HEURISTIC_CAP: usize = 4;

/// Strings must be strictly shorter than this (in characters) to qualify
pub const SHORT_STRING_LIMIT: usize = 12;

/// How a single key/value pair was classified
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Priority,
    Heuristic,
    Rejected,
}

pub fn is_priority_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    PRIORITY_KEYS.contains(&lower.as_str())
}

/// Classify one pair, ignoring the cap
pub fn classify(key: &str, value: &Value) -> Admission {
    if is_priority_key(key) {
        return Admission::Priority;
    }

    match value {
        Value::Number(_) => Admission::Heuristic,
        Value::String(s)
            if s.chars().count() < SHORT_STRING_LIMIT && !s.starts_with("http") && key != "id" =>
        {
            Admission::Heuristic
        }
        Value::String(_) | Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            Admission::Rejected
        }
    }
}

/// Extract display metrics from a decoded JSON document.
///
/// Non-objects yield an empty map. Pairs are visited in document order.
pub fn extract(value: &Value) -> Metrics {
    let mut out = Metrics::new();

    let Value::Object(map) = value else {
        return out;
    };

    for (key, val) in map {
        match classify(key, val) {
            Admission::Priority => {
                out.insert(key.clone(), to_metric(val));
            }
            Admission::Heuristic if out.len() < HEURISTIC_CAP => {
                out.insert(key.clone(), to_metric(val));
            }
            Admission::Heuristic | Admission::Rejected => {}
        }
    }

    out
}

/// Numbers and strings keep their shape, anything else becomes compact JSON text
fn to_metric(value: &Value) -> MetricValue {
    match value {
        Value::Number(n) => MetricValue::Number(n.clone()),
        Value::String(s) => MetricValue::Text(s.clone()),
        other => MetricValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_objects_are_empty() {
        for value in [
            Value::Null,
            json!([1, 2, 3]),
            json!(42),
            json!("hello"),
            json!(true),
        ] {
            assert!(extract(&value).is_empty(), "expected empty for {}", value);
        }
    }

    #[test]
    fn test_github_profile_shape() {
        let body = json!({
            "login": "octocat",
            "id": 583231,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "type": "User",
            "name": "Monalisa Octocat",
            "public_repos": 8,
            "followers": 9000,
            "following": 9,
            "created_at": "2011-01-25T18:44:36Z"
        });

        let metrics = extract(&body);

        // login, id (numeric), type fill the heuristic slots alongside priority keys
        assert_eq!(metrics["login"], MetricValue::text("octocat"));
        assert_eq!(metrics["id"], MetricValue::from(583231));
        assert_eq!(metrics["type"], MetricValue::text("User"));
        assert_eq!(metrics["public_repos"], MetricValue::from(8));
        assert_eq!(metrics["followers"], MetricValue::from(9000));
        assert_eq!(metrics["following"], MetricValue::from(9));
        assert!(!metrics.contains_key("avatar_url"));
        assert!(!metrics.contains_key("name"));
        assert!(!metrics.contains_key("created_at"));
    }

    #[test]
    fn test_heuristic_cap() {
        let body = json!({"a": 1, "b": 2, "c": 3, "d": 4, "e": 5, "f": 6});
        let metrics = extract(&body);

        assert_eq!(metrics.len(), HEURISTIC_CAP);
        assert!(metrics.contains_key("a"));
        assert!(metrics.contains_key("d"));
        assert!(!metrics.contains_key("e"));
    }

    #[test]
    fn test_priority_keys_ignore_cap() {
        let body = json!({
            "a": 1, "b": 2, "c": 3, "d": 4,
            "Version": "1.2.3",
            "region": "eu-west-1",
            "uuid": "9f1c7e2a-1c5b-4c55-9d7e-7c1d5c3b2a10",
            "e": 5
        });
        let metrics = extract(&body);

        assert_eq!(metrics.len(), 7);
        assert_eq!(metrics["Version"], MetricValue::text("1.2.3"));
        assert!(metrics.contains_key("uuid"));
        assert!(!metrics.contains_key("e"));
    }

    #[test]
    fn test_priority_entries_count_toward_heuristic_cap() {
        let body = json!({
            "status": "ok", "version": "2", "origin": "1.2.3.4", "latency": 3,
            "a": 1
        });
        let metrics = extract(&body);

        assert_eq!(metrics.len(), 4);
        assert!(!metrics.contains_key("a"));
    }

    #[test]
    fn test_string_rules() {
        let body = json!({
            "short": "tiny",
            "exactly12chr": "abcdefghijkl",
            "link": "http://x.io",
            "id": "abc"
        });
        let metrics = extract(&body);

        assert_eq!(metrics.len(), 1);
        assert!(metrics.contains_key("short"));
    }

    #[test]
    fn test_id_key_allows_numbers() {
        let metrics = extract(&json!({"id": 7}));
        assert_eq!(metrics["id"], MetricValue::from(7));
    }

    #[test]
    fn test_non_scalars_dropped_unless_priority() {
        let body = json!({
            "flag": true,
            "nothing": null,
            "list": [1, 2],
            "nested": {"x": 1},
            "origin": {"ip": "1.2.3.4"},
            "Status": true
        });
        let metrics = extract(&body);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics["origin"], MetricValue::text(r#"{"ip":"1.2.3.4"}"#));
        assert_eq!(metrics["Status"], MetricValue::text("true"));
    }

    #[test]
    fn test_output_bounded_and_admissible() {
        let body = json!({
            "followers": 1, "forks": 2, "stars": 3,
            "p": 1, "q": "x", "r": 2.5, "s": "y", "t": 9, "u": "z",
            "homepage": "https://example.com", "description": "a long description"
        });
        let priority = body
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| is_priority_key(k))
            .count();

        let metrics = extract(&body);
        assert!(metrics.len() <= priority + HEURISTIC_CAP);

        let obj = body.as_object().unwrap();
        for key in metrics.keys() {
            assert_ne!(classify(key, &obj[key]), Admission::Rejected);
        }
    }
}
