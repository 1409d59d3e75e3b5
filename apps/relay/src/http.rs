use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{HeaderMap, request::Parts},
    middleware,
    routing::{get, post},
};
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::invoke::{InvokeEvent, InvokeResponse};
use crate::relay::Relay;
use crate::reqid::with_request_id;

pub const WEBHOOK_PATH: &str = "/telemetry/webhook";
pub const INVOKE_PATH: &str = "/invoke";
pub const HEALTH_PATH: &str = "/healthz";

pub fn build_router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, post(webhook))
        .route(INVOKE_PATH, post(invoke))
        .route(HEALTH_PATH, get(healthz))
        .layer(middleware::from_fn(with_request_id))
        .with_state(relay)
}

/// Peer address recorded by `into_make_service_with_connect_info`, if any.
#[derive(Debug, Clone, Copy)]
pub struct PeerAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for PeerAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PeerAddr(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        ))
    }
}

/// Caller address used by the allowlist: the first `X-Forwarded-For` entry
/// when proxies are trusted, the socket peer otherwise.
pub fn source_ip(
    config: &RelayConfig,
    peer: Option<SocketAddr>,
    headers: &HeaderMap,
) -> Option<String> {
    if config.trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }
    peer.map(|addr| addr.ip().to_canonical().to_string())
}

async fn webhook(
    State(relay): State<Arc<Relay>>,
    PeerAddr(peer): PeerAddr,
    headers: HeaderMap,
    body: String,
) -> Result<&'static str, RelayError> {
    let ip = source_ip(relay.config(), peer, &headers);
    relay.handle(ip.as_deref(), &body).await.map(|_| "OK")
}

/// The event is only decoded once the gate has admitted the caller, so an
/// unusable event still answers 500 or 403 first.
async fn invoke(State(relay): State<Arc<Relay>>, body: String) -> Json<InvokeResponse> {
    let event = serde_json::from_str::<InvokeEvent>(&body);
    let source_ip = event.as_ref().ok().and_then(InvokeEvent::source_ip);
    let result = relay
        .handle_with(source_ip, || match &event {
            Ok(event) => event.decoded_body(),
            Err(err) => Err(RelayError::InvalidTrigger(err.to_string())),
        })
        .await;
    Json(InvokeResponse::from(result))
}

async fn healthz() -> &'static str {
    "ok"
}
