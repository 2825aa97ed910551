//! Mock exchange speaking the v2 streaming protocol over real WebSocket frames.

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use streamprobe_core::BookLevel;
use streamprobe_feeds::SessionConfig;
use streamprobe_validation::{book_checksum, ChecksumPrecision};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub const SUPPORTED_PAIRS: [&str; 3] = ["BTC/USD", "ETH/USD", "SOL/USD"];
const ALLOWED_DEPTHS: [u64; 5] = [10, 25, 100, 500, 1000];
const TICK: Duration = Duration::from_millis(20);

// ------------------------------------------------------------------------------------------------
// Server
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MockState {
    pub connections: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockState {
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

pub struct MockExchange {
    pub url: String,
    pub state: MockState,
}

impl MockExchange {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = MockState::default();

        let accept_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, accept_state.clone()));
            }
        });

        Self {
            url: format!("ws://{}", addr),
            state,
        }
    }

    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(self.url.clone())
            .with_timeout(Duration::from_secs(2))
            .with_connect_timeout(Duration::from_secs(2))
    }
}

#[derive(Debug, Clone)]
struct Subscription {
    channel: String,
    symbol: String,
    depth: u64,
    interval: u64,
}

async fn handle_connection(stream: TcpStream, state: MockState) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };
    let connection_id = state.connections.fetch_add(1, Ordering::SeqCst) + 1;

    let status = json!({
        "channel": "status",
        "type": "update",
        "data": [{"api_version": "v2", "connection_id": connection_id, "system": "online", "version": "2.0.9"}]
    });
    if ws.send(Message::Text(status.to_string())).await.is_err() {
        return;
    }

    let mut subscriptions: Vec<Subscription> = Vec::new();
    let mut ticker = tokio::time::interval(TICK);
    let mut seq = 0u64;

    loop {
        let frames = tokio::select! {
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let request = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
                    state.requests.lock().unwrap().push(request.clone());
                    handle_request(&request, &mut subscriptions)
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                Some(Ok(_)) => continue,
            },
            _ = ticker.tick() => {
                if subscriptions.is_empty() {
                    continue;
                }
                seq += 1;
                let mut frames = vec![json!({"channel": "heartbeat"})];
                frames.extend(subscriptions.iter().map(|sub| update(sub, seq)));
                frames
            }
        };

        for frame in frames {
            if ws.send(Message::Text(frame.to_string())).await.is_err() {
                return;
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Control plane
// ------------------------------------------------------------------------------------------------

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn reject(method: &str, error: impl Into<String>, symbol: Option<&str>) -> Value {
    let mut ack = json!({
        "method": method,
        "success": false,
        "error": error.into(),
        "time_in": now(),
        "time_out": now(),
    });
    if let Some(symbol) = symbol {
        ack["symbol"] = json!(symbol);
    }
    ack
}

fn accept(method: &str, result: Map<String, Value>) -> Value {
    json!({
        "method": method,
        "success": true,
        "result": result,
        "time_in": now(),
        "time_out": now(),
    })
}

fn handle_request(request: &Value, subscriptions: &mut Vec<Subscription>) -> Vec<Value> {
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    if method != "subscribe" && method != "unsubscribe" {
        return vec![reject(method, "Method not found", None)];
    }

    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));
    let Some(channel) = params.get("channel").and_then(Value::as_str) else {
        return vec![reject(method, "Channel is required", None)];
    };
    if !["ticker", "book", "ohlc", "trade"].contains(&channel) {
        return vec![reject(method, "Channel not found", None)];
    }
    let Some(symbols) = params.get("symbol").and_then(Value::as_array) else {
        return vec![reject(method, "Missing field: symbol", None)];
    };

    let depth = params
        .get("depth")
        .and_then(Value::as_u64)
        .filter(|d| ALLOWED_DEPTHS.contains(d))
        .unwrap_or(10);
    let interval = params
        .get("interval")
        .and_then(Value::as_u64)
        .filter(|i| *i > 0)
        .unwrap_or(1);
    let snapshot = params.get("snapshot").and_then(Value::as_bool).unwrap_or(true);

    let mut frames = Vec::new();
    for symbol in symbols {
        let symbol = symbol.as_str().unwrap_or_default();
        if !SUPPORTED_PAIRS.contains(&symbol) {
            frames.push(reject(
                method,
                format!("Currency pair not supported {}", symbol),
                Some(symbol),
            ));
            continue;
        }

        let mut result = Map::new();
        result.insert("channel".into(), json!(channel));
        result.insert("symbol".into(), json!(symbol));
        match channel {
            "book" => {
                result.insert("depth".into(), json!(depth));
            }
            "ohlc" => {
                result.insert("interval".into(), json!(interval));
            }
            _ => {}
        }

        let sub = Subscription {
            channel: channel.to_string(),
            symbol: symbol.to_string(),
            depth,
            interval,
        };

        if method == "subscribe" {
            result.insert("snapshot".into(), json!(snapshot));
            frames.push(accept(method, result));
            if snapshot {
                frames.push(snapshot_message(&sub));
            }
            subscriptions.push(sub);
        } else {
            let before = subscriptions.len();
            subscriptions.retain(|s| !(s.channel == channel && s.symbol == symbol));
            if subscriptions.len() == before {
                frames.push(reject(method, "Subscription Not Found", Some(symbol)));
            } else {
                frames.push(accept(method, result));
            }
        }
    }
    frames
}

// ------------------------------------------------------------------------------------------------
// Data plane
// ------------------------------------------------------------------------------------------------

fn base_price(symbol: &str) -> f64 {
    match symbol {
        "BTC/USD" => 97000.0,
        "ETH/USD" => 3400.0,
        _ => 190.0,
    }
}

fn snapshot_message(sub: &Subscription) -> Value {
    let record = match sub.channel.as_str() {
        "book" => book(sub, sub.depth as usize),
        "ohlc" => candle(sub, 0),
        "trade" => trade(sub, 0),
        _ => ticker(sub, 0),
    };
    json!({"channel": sub.channel, "type": "snapshot", "data": [record]})
}

fn update(sub: &Subscription, seq: u64) -> Value {
    let record = match sub.channel.as_str() {
        "book" => book(sub, 1),
        "ohlc" => candle(sub, seq),
        "trade" => trade(sub, seq),
        _ => ticker(sub, seq),
    };
    json!({"channel": sub.channel, "type": "update", "data": [record]})
}

fn ticker(sub: &Subscription, seq: u64) -> Value {
    let base = base_price(&sub.symbol);
    let bid = base + seq as f64 * 0.5;
    json!({
        "symbol": sub.symbol,
        "bid": bid,
        "bid_qty": 0.5,
        "ask": bid + 0.5,
        "ask_qty": 1.25,
        "last": bid,
        "volume": 1500.5,
        "vwap": base,
        "low": base * 0.98,
        "high": base * 1.02 + seq as f64,
        "change": 12.5,
        "change_pct": 0.01
    })
}

fn book(sub: &Subscription, levels: usize) -> Value {
    let base = base_price(&sub.symbol);
    let bids: Vec<BookLevel> = (0..levels)
        .map(|i| BookLevel::new(base - (i + 1) as f64 * 0.5, 0.25 * (i + 1) as f64))
        .collect();
    let asks: Vec<BookLevel> = (0..levels)
        .map(|i| BookLevel::new(base + (i + 1) as f64 * 0.5, 0.5 * (i + 1) as f64))
        .collect();
    let checksum = book_checksum(&bids, &asks, ChecksumPrecision::default());
    json!({
        "symbol": sub.symbol,
        "bids": bids,
        "asks": asks,
        "checksum": checksum,
        "timestamp": now()
    })
}

fn candle(sub: &Subscription, seq: u64) -> Value {
    let base = base_price(&sub.symbol);
    let span = sub.interval as i64 * 60;
    let now_secs = Utc::now().timestamp();
    let begin = now_secs - now_secs % span;
    let format = |secs: i64| {
        DateTime::from_timestamp(secs, 0)
            .unwrap()
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    };
    json!({
        "symbol": sub.symbol,
        "open": base,
        "high": base + 5.0,
        "low": base - 5.0,
        "close": base + 1.0,
        "trades": 10 + seq,
        "volume": 2.5,
        "vwap": base + 0.5,
        "interval_begin": format(begin),
        "interval": sub.interval,
        "timestamp": format(begin + span)
    })
}

fn trade(sub: &Subscription, seq: u64) -> Value {
    json!({
        "symbol": sub.symbol,
        "side": if seq % 2 == 0 { "buy" } else { "sell" },
        "qty": 0.01,
        "price": base_price(&sub.symbol),
        "ord_type": if seq % 3 == 0 { "market" } else { "limit" },
        "trade_id": 1000 + seq,
        "timestamp": now()
    })
}
