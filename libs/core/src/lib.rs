//! Core contracts for the change-telemetry webhook relay.
//!
//! This crate holds the inbound telemetry envelope model, the extractor that
//! picks the event to render, and the card renderers that turn an extracted
//! event into a chat-platform webhook payload. It performs no I/O.
pub mod cards;
pub mod extract;
pub mod model;

pub use cards::*;
pub use extract::*;
pub use model::*;
