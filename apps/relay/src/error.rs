use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wrelay_core::ExtractError;
use wrelay_telemetry::RequestOutcome;

use crate::forward::ForwardError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Webhook URL is not set")]
    MissingWebhookUrl,
    #[error("source ip {} is not allowlisted", .0.as_deref().unwrap_or("<unknown>"))]
    Forbidden(Option<String>),
    #[error("malformed telemetry payload")]
    Malformed(#[from] ExtractError),
    #[error("invalid trigger event: {0}")]
    InvalidTrigger(String),
    #[error("forwarding to webhook failed")]
    Forward(#[from] ForwardError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingWebhookUrl => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Forbidden(_) => StatusCode::FORBIDDEN,
            RelayError::Malformed(_) | RelayError::InvalidTrigger(_) => StatusCode::BAD_REQUEST,
            RelayError::Forward(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Plain-text body returned to the caller.
    pub fn body(&self) -> &'static str {
        match self {
            RelayError::MissingWebhookUrl => "Webhook URL is not set",
            RelayError::Forbidden(_) => "Forbidden",
            RelayError::Malformed(_) | RelayError::InvalidTrigger(_) => "Malformed payload",
            RelayError::Forward(_) => "Bad Gateway",
        }
    }

    pub fn outcome(&self) -> RequestOutcome {
        match self {
            RelayError::MissingWebhookUrl => RequestOutcome::Misconfigured,
            RelayError::Forbidden(_) => RequestOutcome::Forbidden,
            RelayError::Malformed(_) | RelayError::InvalidTrigger(_) => RequestOutcome::Malformed,
            RelayError::Forward(_) => RequestOutcome::ForwardFailed,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}
