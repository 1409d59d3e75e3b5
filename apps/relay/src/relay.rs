use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, field, info, info_span, warn};
use wrelay_core::{CardRenderer, Extraction, extract, plain_text};
use wrelay_telemetry::{RequestOutcome, finish_span, record_forward_duration};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::forward::{ForwardError, HttpWebhookSender, WebhookSender};
use crate::gate;

/// What happened to a request that was answered `200 OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    TestProbe,
    Forwarded,
}

impl RelayOutcome {
    fn telemetry(self) -> RequestOutcome {
        match self {
            RelayOutcome::TestProbe => RequestOutcome::TestProbe,
            RelayOutcome::Forwarded => RequestOutcome::Forwarded,
        }
    }
}

/// Gate, extract, render and forward one telemetry notification.
pub struct Relay {
    config: Arc<RelayConfig>,
    renderer: Box<dyn CardRenderer>,
    sender: Arc<dyn WebhookSender>,
}

impl Relay {
    pub fn new(config: RelayConfig, sender: Arc<dyn WebhookSender>) -> Self {
        let renderer = config.card_format.renderer();
        Self {
            config: Arc::new(config),
            renderer,
            sender,
        }
    }

    /// Builds the relay with an HTTP sender using the configured timeout.
    pub fn from_config(config: RelayConfig) -> Result<Self, ForwardError> {
        let sender = HttpWebhookSender::new(config.webhook_timeout)?;
        Ok(Self::new(config, Arc::new(sender)))
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub async fn handle(
        &self,
        source_ip: Option<&str>,
        body: &str,
    ) -> Result<RelayOutcome, RelayError> {
        self.handle_with(source_ip, || Ok(body.to_string())).await
    }

    /// Like [`Relay::handle`], but the body is only produced once the request
    /// has passed the gate. Errors from `body` answer like a malformed payload.
    pub async fn handle_with<F>(
        &self,
        source_ip: Option<&str>,
        body: F,
    ) -> Result<RelayOutcome, RelayError>
    where
        F: FnOnce() -> Result<String, RelayError> + Send,
    {
        let span = info_span!(
            "relay.handle",
            source_ip = source_ip.unwrap_or(""),
            format = self.renderer.format().as_str(),
            outcome = field::Empty
        );
        let result = self
            .process(source_ip, body)
            .instrument(span.clone())
            .await;
        let outcome = match &result {
            Ok(outcome) => outcome.telemetry(),
            Err(err) => err.outcome(),
        };
        finish_span(&span, outcome);
        result
    }

    async fn process<F>(
        &self,
        source_ip: Option<&str>,
        body: F,
    ) -> Result<RelayOutcome, RelayError>
    where
        F: FnOnce() -> Result<String, RelayError> + Send,
    {
        let url = gate::check(&self.config, source_ip)?;

        let body = body().inspect_err(|err| warn!(error = %err, "rejecting trigger event"))?;
        let event = match extract(&body) {
            Ok(Extraction::TestProbe) => {
                info!("webhook test event received; nothing forwarded");
                return Ok(RelayOutcome::TestProbe);
            }
            Ok(Extraction::Event(event)) => event,
            Err(err) => {
                warn!(error = %err, "rejecting malformed telemetry payload");
                return Err(err.into());
            }
        };

        let card = self.renderer.render(&event);
        let started = Instant::now();
        match self.sender.post(url, &card).await {
            Ok(status) => {
                record_forward_duration(
                    started.elapsed().as_secs_f64(),
                    self.renderer.format().as_str(),
                );
                info!(
                    event_type = %plain_text(&event.event_type),
                    account = %plain_text(&event.change.account),
                    status = status.as_u16(),
                    "telemetry event forwarded"
                );
                Ok(RelayOutcome::Forwarded)
            }
            Err(err) => {
                tracing::error!(
                    event_type = %plain_text(&event.event_type),
                    error = %err,
                    "forwarding telemetry event failed"
                );
                Err(err.into())
            }
        }
    }
}
