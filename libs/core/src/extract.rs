use crate::model::{
    ChangeRecord, ExtractedEvent, RawTelemetryEvent, TelemetryEnvelope, is_test_event,
};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("body is not a telemetry envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("telemetry envelope contains no events")]
    NoEvents,
    #[error("first telemetry event is invalid: {0}")]
    Event(#[source] serde_json::Error),
    #[error("first telemetry event has no change record")]
    MissingChange,
    #[error("invalid change record: {0}")]
    Change(#[source] serde_json::Error),
}

/// Result of inspecting an inbound body.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The envelope contains a webhook test event; nothing is forwarded.
    TestProbe,
    Event(ExtractedEvent),
}

/// Parses a raw telemetry body and selects the event to render.
///
/// The list is scanned in order and the first test event short-circuits,
/// whatever the other entries hold. Otherwise only the first event is
/// decoded; the rest are dropped.
///
/// ```
/// use wrelay_core::{Extraction, extract};
///
/// let body = r#"{"telemetryEvents":[{"telemetryEventType":"TEST_TELEMETRY_WEBHOOK"}]}"#;
/// assert_eq!(extract(body).unwrap(), Extraction::TestProbe);
/// ```
pub fn extract(body: &str) -> Result<Extraction, ExtractError> {
    let envelope: TelemetryEnvelope = serde_json::from_str(body).map_err(ExtractError::Envelope)?;

    if envelope.telemetry_events.iter().any(is_test_event) {
        return Ok(Extraction::TestProbe);
    }

    let mut events = envelope.telemetry_events.into_iter();
    let first = events.next().ok_or(ExtractError::NoEvents)?;
    let dropped = events.count();
    if dropped > 0 {
        tracing::debug!(dropped, "ignoring telemetry events after the first");
    }

    let first: RawTelemetryEvent = serde_json::from_value(first).map_err(ExtractError::Event)?;
    let raw = first.telemetry_event.ok_or(ExtractError::MissingChange)?;
    let change: ChangeRecord = serde_json::from_value(raw).map_err(ExtractError::Change)?;

    Ok(Extraction::Event(ExtractedEvent {
        event_type: first.telemetry_event_type,
        change,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn change_json() -> serde_json::Value {
        json!({
            "objectType": "Folder",
            "changeType": "CREATE",
            "changeTime": "t",
            "application": "App",
            "user": "u",
            "object": "o",
            "account": "acct"
        })
    }

    fn event(kind: &str) -> serde_json::Value {
        json!({ "telemetryEventType": kind, "telemetryEvent": change_json() })
    }

    fn body(events: Vec<serde_json::Value>) -> String {
        json!({ "telemetryEvents": events }).to_string()
    }

    #[test]
    fn extracts_first_event() {
        let extraction = extract(&body(vec![event("X")])).unwrap();
        let Extraction::Event(extracted) = extraction else {
            panic!("expected event, got {extraction:?}");
        };
        assert_eq!(extracted.event_type, "X");
        assert_eq!(extracted.change.object_type, "Folder");
        assert_eq!(extracted.change.account, "acct");
        assert!(extracted.change.detail.is_none());
    }

    #[test]
    fn test_probe_anywhere_short_circuits() {
        let payload = body(vec![
            event("X"),
            json!({ "telemetryEventType": "TEST_TELEMETRY_WEBHOOK" }),
        ]);
        assert_eq!(extract(&payload).unwrap(), Extraction::TestProbe);
    }

    #[test]
    fn test_probe_wins_over_malformed_first_event() {
        let payload = body(vec![
            json!({ "telemetryEventType": "X" }),
            json!({ "telemetryEventType": "TEST_TELEMETRY_WEBHOOK", "telemetryEvent": {} }),
        ]);
        assert_eq!(extract(&payload).unwrap(), Extraction::TestProbe);
    }

    #[test]
    fn test_probe_ignores_untyped_neighbours() {
        let payload = body(vec![
            json!({ "telemetryEventType": "TEST_TELEMETRY_WEBHOOK" }),
            json!({ "foo": 1 }),
        ]);
        assert_eq!(extract(&payload).unwrap(), Extraction::TestProbe);
    }

    #[test]
    fn loose_base_field_values_are_accepted() {
        let mut loose = event("X");
        loose["telemetryEvent"]["changeTime"] = json!(1714557600000u64);
        loose["telemetryEvent"]["user"] = json!(null);
        let Extraction::Event(extracted) = extract(&body(vec![loose])).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(extracted.change.change_time, json!(1714557600000u64));
        assert!(extracted.change.user.is_null());
    }

    #[test]
    fn rejects_first_event_without_type() {
        let payload = body(vec![json!({ "telemetryEvent": change_json() })]);
        assert!(matches!(extract(&payload), Err(ExtractError::Event(_))));
    }

    #[traced_test]
    #[test]
    fn only_first_event_is_used() {
        let mut second = event("Y");
        second["telemetryEvent"]["account"] = json!("other");
        let Extraction::Event(extracted) = extract(&body(vec![event("X"), second])).unwrap() else {
            panic!("expected event");
        };
        assert_eq!(extracted.event_type, "X");
        assert_eq!(extracted.change.account, "acct");
        assert!(logs_contain("ignoring telemetry events after the first"));
    }

    #[test]
    fn detail_changes_are_decoded() {
        let mut with_detail = event("X");
        with_detail["telemetryEvent"]["detail"] =
            json!({ "changes": [{ "value": "", "from": "a", "to": "b" }] });
        let Extraction::Event(extracted) = extract(&body(vec![with_detail])).unwrap() else {
            panic!("expected event");
        };
        let changes = extracted.change.detail_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, json!("a"));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(extract("not json"), Err(ExtractError::Envelope(_))));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(matches!(
            extract(r#"{"events": []}"#),
            Err(ExtractError::Envelope(_))
        ));
        assert!(matches!(
            extract(r#"{"telemetryEvents": {}}"#),
            Err(ExtractError::Envelope(_))
        ));
    }

    #[test]
    fn rejects_empty_event_list() {
        assert!(matches!(extract(&body(vec![])), Err(ExtractError::NoEvents)));
    }

    #[test]
    fn rejects_missing_change_record() {
        let payload = body(vec![json!({ "telemetryEventType": "X" })]);
        assert!(matches!(extract(&payload), Err(ExtractError::MissingChange)));
    }

    #[test]
    fn rejects_missing_change_field() {
        let mut partial = event("X");
        partial["telemetryEvent"]
            .as_object_mut()
            .unwrap()
            .remove("account");
        assert!(matches!(
            extract(&body(vec![partial])),
            Err(ExtractError::Change(_))
        ));
    }
}
