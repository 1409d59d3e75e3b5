use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event type the platform sends when an operator tests the webhook.
pub const TEST_EVENT_TYPE: &str = "TEST_TELEMETRY_WEBHOOK";

/// Top-level body posted by the change-tracking platform. Events stay as
/// loose JSON so a test event is recognised whatever its neighbours hold.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEnvelope {
    pub telemetry_events: Vec<Value>,
}

/// True when `event` is a webhook test event.
pub fn is_test_event(event: &Value) -> bool {
    event.get("telemetryEventType").and_then(Value::as_str) == Some(TEST_EVENT_TYPE)
}

/// The event selected for rendering. The change record stays undecoded until
/// the type is known to be present.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTelemetryEvent {
    pub telemetry_event_type: Value,
    #[serde(default)]
    pub telemetry_event: Option<Value>,
}

/// Base fields must be present but may hold any JSON value; they are copied
/// into the card as sent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub object_type: Value,
    pub change_type: Value,
    pub change_time: Value,
    pub application: Value,
    pub user: Value,
    pub object: Value,
    pub account: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ChangeDetail>,
}

impl ChangeRecord {
    /// Detail changes in the order the platform reported them. Empty when the
    /// record carries no `detail` or `detail.changes`.
    pub fn detail_changes(&self) -> &[DetailChange] {
        self.detail
            .as_ref()
            .and_then(|detail| detail.changes.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ChangeDetail {
    #[serde(default)]
    pub changes: Option<Vec<DetailChange>>,
}

/// A single before/after value change. Every field may be missing or empty.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct DetailChange {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub from: Value,
    #[serde(default)]
    pub to: Value,
}

/// The first non-test event of an envelope, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEvent {
    pub event_type: Value,
    pub change: ChangeRecord,
}

impl ExtractedEvent {
    /// `"{account} {eventType} {objectType} {changeType}"`
    pub fn summary(&self) -> String {
        format!(
            "{} {} {} {}",
            plain_text(&self.change.account),
            plain_text(&self.event_type),
            plain_text(&self.change.object_type),
            plain_text(&self.change.change_type)
        )
    }

    /// `"{account} {eventType}"`, used as the card heading.
    pub fn headline(&self) -> String {
        format!(
            "{} {}",
            plain_text(&self.change.account),
            plain_text(&self.event_type)
        )
    }

    /// Base facts in fixed order followed by Value/From/To for each detail change.
    pub fn facts(&self) -> Vec<Fact> {
        let change = &self.change;
        let mut facts = vec![
            Fact::raw("Time", &change.change_time),
            Fact::raw("Object Type", &change.object_type),
            Fact::raw("Change Type", &change.change_type),
            Fact::raw("Object", &change.object),
            Fact::raw("Account", &change.account),
            Fact::raw("User", &change.user),
            Fact::raw("Application", &change.application),
        ];
        for detail in change.detail_changes() {
            facts.push(Fact::or_placeholder("Value", &detail.value));
            facts.push(Fact::or_placeholder("From", &detail.from));
            facts.push(Fact::or_placeholder("To", &detail.to));
        }
        facts
    }
}

/// Shown in place of an empty detail value.
pub const EMPTY_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub title: &'static str,
    pub value: Value,
}

impl Fact {
    fn raw(title: &'static str, value: &Value) -> Self {
        Self {
            title,
            value: value.clone(),
        }
    }

    fn or_placeholder(title: &'static str, value: &Value) -> Self {
        let value = if is_falsy(value) {
            Value::String(EMPTY_PLACEHOLDER.into())
        } else {
            value.clone()
        };
        Self { title, value }
    }
}

/// Text form used in summaries and headings: strings verbatim, `null` as
/// nothing, anything else as compact JSON.
pub fn plain_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Falsy in the loose sense the platform relies on: null, empty string,
/// `false`, zero, and empty collections.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_change() -> ChangeRecord {
        ChangeRecord {
            object_type: json!("Folder"),
            change_type: json!("CREATE"),
            change_time: json!("t"),
            application: json!("App"),
            user: json!("u"),
            object: json!("o"),
            account: json!("acct"),
            detail: None,
        }
    }

    fn titles(facts: &[Fact]) -> Vec<&'static str> {
        facts.iter().map(|fact| fact.title).collect()
    }

    #[test]
    fn summary_and_headline_follow_field_order() {
        let event = ExtractedEvent {
            event_type: json!("X"),
            change: sample_change(),
        };
        assert_eq!(event.summary(), "acct X Folder CREATE");
        assert_eq!(event.headline(), "acct X");
    }

    #[test]
    fn non_string_base_fields_pass_through() {
        let mut change = sample_change();
        change.change_time = json!(1714557600000u64);
        change.user = Value::Null;
        let event = ExtractedEvent {
            event_type: json!("X"),
            change,
        };
        let facts = event.facts();
        assert_eq!(facts[0].value, json!(1714557600000u64));
        assert_eq!(facts[5].value, Value::Null);
        assert_eq!(event.summary(), "acct X Folder CREATE");
    }

    #[test]
    fn plain_text_of_loose_values() {
        assert_eq!(plain_text(&json!("acct")), "acct");
        assert_eq!(plain_text(&Value::Null), "");
        assert_eq!(plain_text(&json!(42)), "42");
        assert_eq!(plain_text(&json!(true)), "true");
    }

    #[test]
    fn test_event_is_detected_by_type() {
        assert!(is_test_event(&json!({ "telemetryEventType": TEST_EVENT_TYPE })));
        assert!(!is_test_event(&json!({ "telemetryEventType": "X" })));
        assert!(!is_test_event(&json!({ "foo": 1 })));
        assert!(!is_test_event(&json!(5)));
    }

    #[test]
    fn base_facts_are_fixed() {
        let event = ExtractedEvent {
            event_type: json!("X"),
            change: sample_change(),
        };
        let facts = event.facts();
        assert_eq!(
            titles(&facts),
            vec![
                "Time",
                "Object Type",
                "Change Type",
                "Object",
                "Account",
                "User",
                "Application"
            ]
        );
        let values: Vec<_> = facts.iter().map(|fact| fact.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                json!("t"),
                json!("Folder"),
                json!("CREATE"),
                json!("o"),
                json!("acct"),
                json!("u"),
                json!("App")
            ]
        );
    }

    #[test]
    fn detail_changes_append_with_placeholder() {
        let mut change = sample_change();
        change.detail = Some(ChangeDetail {
            changes: Some(vec![
                DetailChange {
                    value: json!(""),
                    from: json!("a"),
                    to: json!("b"),
                },
                DetailChange {
                    value: json!("ttl"),
                    from: Value::Null,
                    to: json!(300),
                },
            ]),
        });
        let event = ExtractedEvent {
            event_type: json!("X"),
            change,
        };
        let facts = event.facts();
        assert_eq!(facts.len(), 13);
        let tail: Vec<_> = facts[7..]
            .iter()
            .map(|fact| (fact.title, fact.value.clone()))
            .collect();
        assert_eq!(
            tail,
            vec![
                ("Value", json!("-")),
                ("From", json!("a")),
                ("To", json!("b")),
                ("Value", json!("ttl")),
                ("From", json!("-")),
                ("To", json!(300)),
            ]
        );
    }

    #[test]
    fn detail_without_changes_adds_nothing() {
        let mut change = sample_change();
        change.detail = Some(ChangeDetail::default());
        assert!(change.detail_changes().is_empty());
    }

    #[test]
    fn falsy_matches_loose_truthiness() {
        for value in [
            json!(null),
            json!(""),
            json!(false),
            json!(0),
            json!(0.0),
            json!([]),
            json!({}),
        ] {
            assert!(is_falsy(&value), "{value} should be falsy");
        }
        for value in [json!("x"), json!(true), json!(1), json!([0]), json!({"a": 1})] {
            assert!(!is_falsy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn missing_detail_fields_decode_as_null() {
        let change: DetailChange = serde_json::from_value(json!({"to": "b"})).unwrap();
        assert_eq!(change.value, Value::Null);
        assert_eq!(change.from, Value::Null);
        assert_eq!(change.to, json!("b"));
    }
}
