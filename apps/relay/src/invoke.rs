//! Function-URL style trigger: the caller posts the whole HTTP event
//! (`requestContext.http.sourceIp` plus a string `body`) and receives a
//! `{statusCode, body}` object back.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::relay::RelayOutcome;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeEvent {
    #[serde(default)]
    pub request_context: Option<RequestContext>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpContext {
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl InvokeEvent {
    pub fn source_ip(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.source_ip.as_deref())
    }

    /// The telemetry body as text, base64-decoded when flagged.
    pub fn decoded_body(&self) -> Result<String, RelayError> {
        let raw = self.body.clone().unwrap_or_default();
        if !self.is_base64_encoded {
            return Ok(raw);
        }
        let bytes = B64
            .decode(raw.trim())
            .map_err(|err| RelayError::InvalidTrigger(format!("body is not base64: {err}")))?;
        String::from_utf8(bytes)
            .map_err(|err| RelayError::InvalidTrigger(format!("body is not utf-8: {err}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvokeResponse {
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: "OK".into(),
        }
    }
}

impl From<&RelayError> for InvokeResponse {
    fn from(err: &RelayError) -> Self {
        Self {
            status_code: err.status().as_u16(),
            body: err.body().to_string(),
        }
    }
}

impl From<Result<RelayOutcome, RelayError>> for InvokeResponse {
    fn from(result: Result<RelayOutcome, RelayError>) -> Self {
        match result {
            Ok(_) => InvokeResponse::ok(),
            Err(err) => InvokeResponse::from(&err),
        }
    }
}
