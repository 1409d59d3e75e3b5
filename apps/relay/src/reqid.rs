use axum::{
    body::Body,
    http::{HeaderValue, Request, header::HeaderName},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Runs the request inside a span carrying a fresh id and echoes the id on
/// the response.
pub async fn with_request_id(req: Request<Body>, next: Next) -> Response {
    let rid = Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %rid);

    let mut res = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&rid) {
        res.headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    res
}
