//! Inbound message classification.
//!
//! Every inbound frame is exactly one of:
//! - control-plane noise (`channel` is `heartbeat` or `status`)
//! - a control acknowledgment (carries a `method` tag)
//! - a data message (any other `channel`, with `type` and `data`)
//!
//! A `method` tag wins over a `channel` tag. A frame with neither, or a
//! frame that is not a JSON object, is a decoding error.

use crate::{is_control_channel, ControlAck, HEARTBEAT_CHANNEL};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors decoding an inbound frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has neither a method nor a channel tag: {0}")]
    Untagged(String),
}

/// Data message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Snapshot,
    Update,
}

/// Channel data message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataMessage {
    pub channel: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default)]
    pub data: Vec<Value>,
}

impl DataMessage {
    #[inline]
    pub fn is_snapshot(&self) -> bool {
        self.kind == MessageType::Snapshot
    }

    /// Decode the `data` array into typed records.
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.data
            .iter()
            .map(|v| T::deserialize(v))
            .collect::<Result<Vec<T>, _>>()
    }

    /// Symbols mentioned by the records, in order, without deduplication.
    pub fn symbols(&self) -> Vec<&str> {
        self.data
            .iter()
            .filter_map(|v| v.get("symbol").and_then(Value::as_str))
            .collect()
    }
}

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Heartbeat,
    /// Status message, kept whole.
    Status(Value),
    Ack(ControlAck),
    Data(DataMessage),
}

impl Inbound {
    /// Parse and classify a text frame.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Classify an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        if value.get("method").is_some() {
            return Ok(Inbound::Ack(serde_json::from_value(value)?));
        }

        match value.get("channel").and_then(Value::as_str) {
            Some(HEARTBEAT_CHANNEL) => Ok(Inbound::Heartbeat),
            Some(name) if is_control_channel(name) => Ok(Inbound::Status(value)),
            Some(_) => Ok(Inbound::Data(serde_json::from_value(value)?)),
            None => Err(DecodeError::Untagged(truncate(&value.to_string(), 200))),
        }
    }

    /// Heartbeat, status or acknowledgment.
    #[inline]
    pub fn is_noise(&self) -> bool {
        !matches!(self, Inbound::Data(_))
    }

    pub fn channel(&self) -> Option<&str> {
        match self {
            Inbound::Heartbeat => Some(HEARTBEAT_CHANNEL),
            Inbound::Status(v) => v.get("channel").and_then(Value::as_str),
            Inbound::Ack(ack) => ack.channel(),
            Inbound::Data(msg) => Some(msg.channel.as_str()),
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Inbound::Ack(ack) => Some(ack.method.as_str()),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<DataMessage> {
        match self {
            Inbound::Data(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn into_ack(self) -> Option<ControlAck> {
        match self {
            Inbound::Ack(ack) => Some(ack),
            _ => None,
        }
    }

    /// JSON form, used when persisting captured messages.
    pub fn to_value(&self) -> Value {
        match self {
            Inbound::Heartbeat => serde_json::json!({ "channel": HEARTBEAT_CHANNEL }),
            Inbound::Status(v) => v.clone(),
            Inbound::Ack(ack) => serde_json::to_value(ack).unwrap_or(Value::Null),
            Inbound::Data(msg) => serde_json::to_value(msg).unwrap_or(Value::Null),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
