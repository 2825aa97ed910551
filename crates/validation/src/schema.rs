//! Structural validation of raw JSON messages.
//!
//! A schema is a Rust type: a message conforms when it decodes into the type.
//! Extra fields are allowed; missing required fields and wrong JSON types are
//! not. Failures point at the offending record with a `$.data[i]` path.

use crate::ValidationError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use streamprobe_core::{
    BookRecord, CandleRecord, Channel, ChannelMessage, ControlAck, TickerRecord, TradeRecord,
};

/// Decode `message` into `T`, reporting the root path on failure.
pub fn validate_schema<T: DeserializeOwned>(message: &Value) -> Result<T, ValidationError> {
    serde_json::from_value(message.clone()).map_err(|e| ValidationError::Schema {
        path: "$".to_string(),
        reason: e.to_string(),
    })
}

/// Validate a data message for `channel` with records of type `R`.
///
/// Beyond decoding, the `channel` tag must match and `data` must not be empty.
pub fn validate_channel_message<R: DeserializeOwned>(
    message: &Value,
    channel: &str,
) -> Result<ChannelMessage<R>, ValidationError> {
    for field in ["channel", "type", "data"] {
        if message.get(field).is_none() {
            return Err(ValidationError::Schema {
                path: format!("$.{}", field),
                reason: "missing required field".to_string(),
            });
        }
    }

    if let Some(Value::Array(records)) = message.get("data") {
        for (i, record) in records.iter().enumerate() {
            if let Err(e) = serde_json::from_value::<R>(record.clone()) {
                return Err(ValidationError::Schema {
                    path: format!("$.data[{}]", i),
                    reason: e.to_string(),
                });
            }
        }
    }

    let decoded: ChannelMessage<R> = validate_schema(message)?;
    if decoded.channel != channel {
        return Err(ValidationError::mismatch("channel", channel, &decoded.channel));
    }
    if decoded.data.is_empty() {
        return Err(ValidationError::Empty { field: "data" });
    }
    Ok(decoded)
}

/// Validate a data message against the schema of a known channel.
pub fn validate_channel_schema(message: &Value, channel: Channel) -> Result<(), ValidationError> {
    let name = channel.as_str();
    match channel {
        Channel::Ticker => validate_channel_message::<TickerRecord>(message, name).map(|_| ()),
        Channel::Book => validate_channel_message::<BookRecord>(message, name).map(|_| ()),
        Channel::Ohlc => validate_channel_message::<CandleRecord>(message, name).map(|_| ()),
        Channel::Trade => validate_channel_message::<TradeRecord>(message, name).map(|_| ()),
    }
}

/// Validate an acknowledgment: it must decode, carry round-trip timing, and a
/// successful one must carry a result descriptor.
pub fn validate_ack_schema(message: &Value) -> Result<ControlAck, ValidationError> {
    let ack: ControlAck = validate_schema(message)?;
    if message.get("success").and_then(Value::as_bool).is_none() {
        return Err(ValidationError::Schema {
            path: "$.success".to_string(),
            reason: "missing boolean field".to_string(),
        });
    }
    if !ack.has_timing() {
        return Err(ValidationError::Schema {
            path: "$.time_in".to_string(),
            reason: "missing round-trip timestamps".to_string(),
        });
    }
    if ack.success && ack.result.is_none() {
        return Err(ValidationError::Schema {
            path: "$.result".to_string(),
            reason: "successful acknowledgment without result".to_string(),
        });
    }
    Ok(ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ticker_message() -> Value {
        json!({
            "channel": "ticker",
            "type": "snapshot",
            "data": [{
                "symbol": "BTC/USD", "bid": 97000.0, "bid_qty": 0.5, "ask": 97000.1, "ask_qty": 1.2,
                "last": 97000.0, "volume": 1500.0, "vwap": 96500.0, "low": 95000.0, "high": 98000.0,
                "change": 100.0, "change_pct": 0.1
            }]
        })
    }

    #[test]
    fn test_valid_ticker_schema() {
        assert!(validate_channel_schema(&ticker_message(), Channel::Ticker).is_ok());
    }

    #[test]
    fn test_extra_fields_allowed() {
        let mut msg = ticker_message();
        msg["data"][0]["new_field"] = json!("x");
        assert!(validate_channel_schema(&msg, Channel::Ticker).is_ok());
    }

    #[test]
    fn test_wrong_type_reports_record_path() {
        let mut msg = ticker_message();
        msg["data"][0]["bid"] = json!("97000.0");
        match validate_channel_schema(&msg, Channel::Ticker) {
            Err(ValidationError::Schema { path, .. }) => assert_eq!(path, "$.data[0]"),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_top_level_field() {
        let mut msg = ticker_message();
        msg.as_object_mut().unwrap().remove("type");
        match validate_channel_schema(&msg, Channel::Ticker) {
            Err(ValidationError::Schema { path, .. }) => assert_eq!(path, "$.type"),
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_channel_mismatch_and_empty_data() {
        let msg = ticker_message();
        assert!(matches!(
            validate_channel_message::<TickerRecord>(&msg, "book"),
            Err(ValidationError::Mismatch { field: "channel", .. })
        ));

        let empty = json!({"channel": "trade", "type": "update", "data": []});
        assert_eq!(
            validate_channel_schema(&empty, Channel::Trade),
            Err(ValidationError::Empty { field: "data" })
        );
    }

    #[test]
    fn test_ack_schema() {
        let ok = json!({
            "method": "subscribe", "success": true,
            "result": {"channel": "book", "symbol": "BTC/USD", "depth": 10, "snapshot": true},
            "time_in": "2024-01-01T00:00:00.000000Z", "time_out": "2024-01-01T00:00:00.000100Z"
        });
        assert_eq!(validate_ack_schema(&ok).unwrap().channel(), Some("book"));

        let no_timing = json!({"method": "subscribe", "success": true, "result": {"channel": "book"}});
        assert!(validate_ack_schema(&no_timing).is_err());

        let no_result = json!({
            "method": "subscribe", "success": true,
            "time_in": "2024-01-01T00:00:00Z", "time_out": "2024-01-01T00:00:00Z"
        });
        assert!(validate_ack_schema(&no_result).is_err());
    }
}
