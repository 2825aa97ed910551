//! Outbound control requests.
//!
//! Wire shape:
//! `{"method": "subscribe", "params": {"channel": "book", "symbol": ["BTC/USD"], "depth": 10}}`
//!
//! Options are merged flat into `params` after `channel` and `symbol`, so an
//! option named `channel` or `symbol` overrides the positional value. Option
//! values are never validated or defaulted locally.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Control request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Subscribe,
    Unsubscribe,
}

impl Method {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Subscribe => "subscribe",
            Method::Unsubscribe => "unsubscribe",
        }
    }

    /// Returns true if `tag` is the wire name of this method.
    #[inline]
    pub fn matches(self, tag: &str) -> bool {
        self.as_str() == tag
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel-specific request options (`depth`, `interval`, `snapshot`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary option. `Value::Null` is sent as JSON `null`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Order book depth.
    pub fn depth(self, depth: u32) -> Self {
        self.with("depth", depth)
    }

    /// Candle interval in minutes.
    pub fn interval(self, minutes: u32) -> Self {
        self.with("interval", minutes)
    }

    /// Whether the first message should be a snapshot.
    pub fn snapshot(self, snapshot: bool) -> Self {
        self.with("snapshot", snapshot)
    }

    /// Ticker event trigger (`bbo` or `trades`).
    pub fn event_trigger(self, trigger: impl Into<String>) -> Self {
        self.with("event_trigger", trigger.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A subscribe or unsubscribe request. Not retained after sending.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlRequest {
    pub method: Method,
    pub channel: String,
    pub symbols: Vec<String>,
    pub options: Options,
    /// Optional client request id. The session never sets it; acknowledgments
    /// are correlated by method only.
    pub req_id: Option<u64>,
}

impl ControlRequest {
    pub fn new<S: AsRef<str>>(
        method: Method,
        channel: impl Into<String>,
        symbols: &[S],
        options: Options,
    ) -> Self {
        Self {
            method,
            channel: channel.into(),
            symbols: symbols.iter().map(|s| s.as_ref().to_string()).collect(),
            options,
            req_id: None,
        }
    }

    pub fn subscribe<S: AsRef<str>>(channel: impl Into<String>, symbols: &[S]) -> Self {
        Self::new(Method::Subscribe, channel, symbols, Options::new())
    }

    pub fn unsubscribe<S: AsRef<str>>(channel: impl Into<String>, symbols: &[S]) -> Self {
        Self::new(Method::Unsubscribe, channel, symbols, Options::new())
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_req_id(mut self, req_id: u64) -> Self {
        self.req_id = Some(req_id);
        self
    }

    /// Build the JSON payload.
    pub fn to_value(&self) -> Value {
        let mut params = Map::new();
        params.insert("channel".to_string(), Value::String(self.channel.clone()));
        params.insert(
            "symbol".to_string(),
            Value::Array(self.symbols.iter().cloned().map(Value::String).collect()),
        );
        for (key, value) in self.options.iter() {
            params.insert(key.clone(), value.clone());
        }

        let mut root = Map::new();
        root.insert("method".to_string(), Value::String(self.method.as_str().to_string()));
        root.insert("params".to_string(), Value::Object(params));
        if let Some(req_id) = self.req_id {
            root.insert("req_id".to_string(), Value::from(req_id));
        }
        Value::Object(root)
    }

    /// Serialize to the text frame sent on the wire.
    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }
}

impl Serialize for ControlRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_subscribe_payload_shape() {
        let req = ControlRequest::subscribe("ticker", &["BTC/USD", "SOL/USD"]);
        assert_eq!(
            req.to_value(),
            json!({
                "method": "subscribe",
                "params": {"channel": "ticker", "symbol": ["BTC/USD", "SOL/USD"]}
            })
        );
    }

    #[test]
    fn test_options_merged_into_params() {
        let req = ControlRequest::subscribe("book", &["BTC/USD"])
            .with_options(Options::new().depth(10).snapshot(false));
        let value = req.to_value();
        assert_eq!(value["params"]["depth"], json!(10));
        assert_eq!(value["params"]["snapshot"], json!(false));
        assert_eq!(value["params"]["channel"], json!("book"));
    }

    #[test]
    fn test_empty_symbols_and_null_option_sent_as_is() {
        let req = ControlRequest::new(
            Method::Unsubscribe,
            "",
            &[] as &[&str],
            Options::new().with("depth", Value::Null),
        );
        assert_eq!(
            req.to_value(),
            json!({
                "method": "unsubscribe",
                "params": {"channel": "", "symbol": [], "depth": null}
            })
        );
    }

    #[test]
    fn test_option_overrides_positional_field() {
        let req = ControlRequest::subscribe("ticker", &["BTC/USD"])
            .with_options(Options::new().with("channel", Value::Null));
        assert_eq!(req.to_value()["params"]["channel"], Value::Null);
    }

    #[test]
    fn test_req_id_only_when_set() {
        let req = ControlRequest::subscribe("trade", &["BTC/USD"]);
        assert!(req.to_value().get("req_id").is_none());
        let req = req.with_req_id(7);
        assert_eq!(req.to_value()["req_id"], json!(7));
    }

    #[test]
    fn test_method_matches() {
        assert!(Method::Subscribe.matches("subscribe"));
        assert!(!Method::Subscribe.matches("unsubscribe"));
        assert_eq!(Method::Unsubscribe.to_string(), "unsubscribe");
    }
}
