use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{info, warn};
use wrelay_server::{Relay, RelayConfig, build_router};
use wrelay_telemetry::install as init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry("webhook-relay")?;

    let config = RelayConfig::from_env().context("invalid relay configuration")?;
    if config.webhook_url.is_none() {
        warn!("WEBHOOK_URL is not set; every request will be answered with 500");
    }
    info!(
        bind = %config.bind,
        card_format = %config.card_format,
        allowlist = config.allowlist.as_ref().map(Vec::len),
        trust_forwarded_for = config.trust_forwarded_for,
        "relay configured"
    );

    let bind = config.bind;
    let relay = Relay::from_config(config).context("failed to build webhook client")?;
    let router = build_router(Arc::new(relay));

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("webhook-relay listening on {}", bind);

    serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    Ok(())
}
