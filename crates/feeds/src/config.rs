//! Session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default public v2 endpoint.
pub const DEFAULT_WS_URL: &str = "wss://ws.kraken.com/v2";

pub const ENV_WS_URL: &str = "STREAMPROBE_WS_URL";
pub const ENV_TIMEOUT_MS: &str = "STREAMPROBE_TIMEOUT_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "STREAMPROBE_CONNECT_TIMEOUT_MS";

/// Configuration for a subscription session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// WebSocket URL
    pub ws_url: String,
    /// Default wait for acknowledgments (ms)
    pub timeout_ms: u64,
    /// Connection and handshake timeout (ms)
    pub connect_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
        }
    }
}

impl SessionConfig {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Build from environment variables, falling back to defaults for unset
    /// or unparsable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_WS_URL).filter(|u| !u.is_empty()) {
            config.ws_url = url;
        }
        if let Some(ms) = parse_ms(&lookup, ENV_TIMEOUT_MS) {
            config.timeout_ms = ms;
        }
        if let Some(ms) = parse_ms(&lookup, ENV_CONNECT_TIMEOUT_MS) {
            config.connect_timeout_ms = ms;
        }
        config
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn parse_ms(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(ms),
        Err(e) => {
            warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}
