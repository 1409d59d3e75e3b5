//! Webhook relay service: receives change-telemetry notifications, renders
//! the first event as a chat card and posts it to an incoming webhook.
pub mod config;
pub mod error;
pub mod forward;
pub mod gate;
pub mod http;
pub mod invoke;
pub mod relay;
pub mod reqid;

pub use config::{ConfigError, RelayConfig};
pub use error::RelayError;
pub use forward::{ForwardError, HttpWebhookSender, WebhookSender};
pub use http::build_router;
pub use invoke::{InvokeEvent, InvokeResponse};
pub use relay::{Relay, RelayOutcome};
