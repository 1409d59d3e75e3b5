use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use wrelay_core::{CardFormat, UnknownCardFormat};

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BIND address `{value}`")]
    Bind {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid WEBHOOK_TIMEOUT_SECS `{value}`")]
    Timeout {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid boolean `{value}` for {key}")]
    Flag { key: &'static str, value: String },
    #[error("invalid CARD_FORMAT")]
    CardFormat(#[from] UnknownCardFormat),
}

/// Settings the relay is constructed with. Request handling never reads the
/// environment; everything it needs is here.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Incoming-webhook endpoint cards are posted to. `None` turns every
    /// request into a configuration error.
    pub webhook_url: Option<String>,
    /// Permitted caller IPs. `None` admits everyone.
    pub allowlist: Option<Vec<String>>,
    pub card_format: CardFormat,
    pub bind: SocketAddr,
    /// Take the caller address from `X-Forwarded-For` instead of the peer.
    pub trust_forwarded_for: bool,
    pub webhook_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            allowlist: None,
            card_format: CardFormat::default(),
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            trust_forwarded_for: false,
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_url = lookup("WEBHOOK_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let allowlist = lookup("WHITELISTED_IPS").map(|raw| parse_allowlist(&raw));
        let card_format = match lookup("CARD_FORMAT") {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<CardFormat>()?,
            _ => CardFormat::default(),
        };
        let bind_raw = lookup("BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind: SocketAddr = bind_raw.parse().map_err(|source| ConfigError::Bind {
            value: bind_raw.clone(),
            source,
        })?;
        let trust_forwarded_for = match lookup("TRUST_FORWARDED_FOR") {
            Some(raw) => parse_flag("TRUST_FORWARDED_FOR", &raw)?,
            None => false,
        };
        let webhook_timeout = match lookup("WEBHOOK_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|source| ConfigError::Timeout {
                        value: raw.clone(),
                        source,
                    })?,
            ),
            None => Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        };

        Ok(Self {
            webhook_url,
            allowlist,
            card_format,
            bind,
            trust_forwarded_for,
            webhook_timeout,
        })
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn with_allowlist(mut self, raw: &str) -> Self {
        self.allowlist = Some(parse_allowlist(raw));
        self
    }

    pub fn with_card_format(mut self, format: CardFormat) -> Self {
        self.card_format = format;
        self
    }

    /// Exact match of `ip` against the trimmed allowlist entries. Always
    /// true when no allowlist is configured.
    pub fn is_allowed(&self, ip: &str) -> bool {
        match &self.allowlist {
            Some(list) => list.iter().any(|entry| entry == ip),
            None => true,
        }
    }
}

/// Splits a comma-separated list and trims each entry. Empty entries are
/// kept, so a present-but-empty variable admits nobody.
pub fn parse_allowlist(raw: &str) -> Vec<String> {
    raw.split(',').map(|ip| ip.trim().to_string()).collect()
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Flag {
            key,
            value: raw.to_string(),
        }),
    }
}
