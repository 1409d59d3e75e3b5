use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::model::ExtractedEvent;

mod adaptive;
mod legacy;

pub use adaptive::AdaptiveCardRenderer;
pub use legacy::LegacyMessageCardRenderer;

/// Renders an extracted event into the JSON body posted to the chat webhook.
pub trait CardRenderer: Send + Sync {
    fn format(&self) -> CardFormat;
    fn render(&self, event: &ExtractedEvent) -> Value;
}

/// Payload schema accepted by the receiving incoming webhook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardFormat {
    /// Adaptive card wrapped in a message attachment.
    #[default]
    Adaptive,
    /// Connector `MessageCard` understood by older webhook endpoints.
    Legacy,
}

impl CardFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardFormat::Adaptive => "adaptive",
            CardFormat::Legacy => "legacy",
        }
    }

    pub fn renderer(self) -> Box<dyn CardRenderer> {
        match self {
            CardFormat::Adaptive => Box::new(AdaptiveCardRenderer),
            CardFormat::Legacy => Box::new(LegacyMessageCardRenderer),
        }
    }
}

impl fmt::Display for CardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown card format `{0}` (expected `adaptive` or `legacy`)")]
pub struct UnknownCardFormat(pub String);

impl FromStr for CardFormat {
    type Err = UnknownCardFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adaptive" | "adaptive-card" | "adaptivecard" => Ok(CardFormat::Adaptive),
            "legacy" | "message-card" | "messagecard" => Ok(CardFormat::Legacy),
            _ => Err(UnknownCardFormat(s.to_string())),
        }
    }
}
