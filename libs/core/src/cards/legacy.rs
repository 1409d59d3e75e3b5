use serde_json::{Value, json};

use super::{CardFormat, CardRenderer};
use crate::model::ExtractedEvent;

#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyMessageCardRenderer;

impl CardRenderer for LegacyMessageCardRenderer {
    fn format(&self) -> CardFormat {
        CardFormat::Legacy
    }

    fn render(&self, event: &ExtractedEvent) -> Value {
        let facts: Vec<Value> = event
            .facts()
            .into_iter()
            .map(|fact| json!({"name": fact.title, "value": fact.value}))
            .collect();

        json!({
          "@type": "MessageCard",
          "@context": "http://schema.org/extensions",
          "summary": event.summary(),
          "title": event.headline(),
          "sections": [{ "facts": facts }]
        })
    }
}
