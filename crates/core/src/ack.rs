//! Control acknowledgments.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Symbol echo in an acknowledgment result. The service echoes a single pair
/// per acknowledgment, but a list is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolEcho {
    One(String),
    Many(Vec<String>),
}

impl SymbolEcho {
    pub fn contains(&self, symbol: &str) -> bool {
        match self {
            SymbolEcho::One(s) => s == symbol,
            SymbolEcho::Many(list) => list.iter().any(|s| s == symbol),
        }
    }
}

/// Result descriptor of a successful acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckResult {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolEcho>,
    /// Echoed channel options (`depth`, `snapshot`, `event_trigger`, `warnings`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inbound acknowledgment of a control request.
///
/// Correlated to its request only through `method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlAck {
    pub method: String,
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AckResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_id: Option<u64>,
}

impl ControlAck {
    /// Channel echoed in the result, if any.
    pub fn channel(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.channel.as_str())
    }

    /// Error text as sent by the remote service.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error")
    }

    /// Echoed option from the result descriptor.
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.result.as_ref().and_then(|r| r.extra.get(key))
    }

    /// Both round-trip timestamps are present.
    pub fn has_timing(&self) -> bool {
        self.time_in.is_some() && self.time_out.is_some()
    }
}
