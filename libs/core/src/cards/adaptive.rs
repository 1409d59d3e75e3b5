use serde_json::{Value, json};

use super::{CardFormat, CardRenderer};
use crate::model::ExtractedEvent;

const ADAPTIVE_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
const ADAPTIVE_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const ADAPTIVE_VERSION: &str = "1.2";

/// Adaptive card with a bold heading and a fact set, wrapped in a message
/// attachment as incoming webhooks expect.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveCardRenderer;

impl CardRenderer for AdaptiveCardRenderer {
    fn format(&self) -> CardFormat {
        CardFormat::Adaptive
    }

    fn render(&self, event: &ExtractedEvent) -> Value {
        let facts: Vec<Value> = event
            .facts()
            .into_iter()
            .map(|fact| json!({"title": fact.title, "value": fact.value}))
            .collect();

        json!({
          "summary": event.summary(),
          "attachments": [{
            "contentType": ADAPTIVE_CONTENT_TYPE,
            "content": {
              "type": "AdaptiveCard",
              "$schema": ADAPTIVE_SCHEMA,
              "version": ADAPTIVE_VERSION,
              "body": [
                {
                  "type": "TextBlock",
                  "text": format!("**{}**", event.headline()),
                  "weight": "Bolder",
                  "size": "Medium"
                },
                {
                  "type": "FactSet",
                  "facts": facts
                }
              ]
            }
          }]
        })
    }
}
