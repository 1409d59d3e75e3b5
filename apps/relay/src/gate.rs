use tracing::warn;

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Admits a request and yields the webhook URL to forward to.
///
/// The webhook URL is checked first, so a misconfigured relay answers 500
/// regardless of the caller. A caller without a known address is rejected
/// whenever an allowlist is configured.
pub fn check<'a>(config: &'a RelayConfig, source_ip: Option<&str>) -> Result<&'a str, RelayError> {
    let Some(url) = config.webhook_url.as_deref() else {
        warn!("rejecting request: webhook url is not configured");
        return Err(RelayError::MissingWebhookUrl);
    };

    if config.allowlist.is_some() {
        let admitted = source_ip.is_some_and(|ip| config.is_allowed(ip));
        if !admitted {
            warn!(
                source_ip = source_ip.unwrap_or("<unknown>"),
                "rejecting request: source ip not allowlisted"
            );
            return Err(RelayError::Forbidden(source_ip.map(str::to_string)));
        }
    }

    Ok(url)
}
