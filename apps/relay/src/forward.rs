use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Longest slice of a failed response body kept for the error message.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("failed to build webhook client")]
    Client(#[source] reqwest::Error),
    #[error("failed to encode card")]
    Encode(#[from] serde_json::Error),
    #[error("webhook request failed")]
    Transport(#[source] reqwest::Error),
    #[error("webhook responded with status={status} body={body}")]
    Status { status: StatusCode, body: String },
}

/// Delivers a rendered card to an incoming-webhook URL.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// Posts `card` as JSON. Any non-2xx answer is an error; nothing is retried.
    async fn post(&self, url: &str, card: &Value) -> Result<StatusCode, ForwardError>;
}

pub struct HttpWebhookSender {
    http: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ForwardError::Client)?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn post(&self, url: &str, card: &Value) -> Result<StatusCode, ForwardError> {
        let body = serde_json::to_vec(card)?;
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ForwardError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(ForwardError::Status { status, body });
        }
        Ok(status)
    }
}

fn truncate_on_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
