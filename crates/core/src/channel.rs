//! Channel identifiers.
//!
//! The session itself never validates channel names; they are sent as-is and
//! the remote service decides. `Channel` exists for callers that want a typed
//! name for the four data channels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved channel carrying keep-alive messages.
pub const HEARTBEAT_CHANNEL: &str = "heartbeat";
/// Reserved channel carrying connection/system status messages.
pub const STATUS_CHANNEL: &str = "status";

/// Returns true for channels that only carry control-plane noise.
#[inline]
pub fn is_control_channel(name: &str) -> bool {
    name == HEARTBEAT_CHANNEL || name == STATUS_CHANNEL
}

/// Public market data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Ticker,
    Book,
    Ohlc,
    Trade,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Ticker, Channel::Book, Channel::Ohlc, Channel::Trade];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ticker" => Some(Channel::Ticker),
            "book" => Some(Channel::Book),
            "ohlc" => Some(Channel::Ohlc),
            "trade" => Some(Channel::Trade),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Ticker => "ticker",
            Channel::Book => "book",
            Channel::Ohlc => "ohlc",
            Channel::Trade => "trade",
        }
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::from_name(&s.to_lowercase()).ok_or_else(|| format!("unknown channel: {}", s))
    }
}
