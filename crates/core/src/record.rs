//! Typed records carried in the `data` array of each channel.
//!
//! These double as the structural schema of each channel: a message that
//! decodes into `ChannelMessage<T>` has every required field with the right
//! JSON type.

use crate::MessageType;
use serde::{Deserialize, Serialize};

/// Typed view of a data message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage<T> {
    pub channel: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub data: Vec<T>,
}

pub type TickerMessage = ChannelMessage<TickerRecord>;
pub type BookMessage = ChannelMessage<BookRecord>;
pub type OhlcMessage = ChannelMessage<CandleRecord>;
pub type TradeMessage = ChannelMessage<TradeRecord>;

/// Level 1 ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: String,
    pub bid: f64,
    #[serde(default)]
    pub bid_qty: f64,
    pub ask: f64,
    #[serde(default)]
    pub ask_qty: f64,
    pub last: f64,
    pub volume: f64,
    pub vwap: f64,
    pub low: f64,
    pub high: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_pct: Option<f64>,
}

/// Single price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub qty: f64,
}

impl BookLevel {
    pub fn new(price: f64, qty: f64) -> Self {
        Self { price, qty }
    }
}

/// Order book snapshot or update for one symbol.
///
/// Bids are best-first (descending), asks are best-first (ascending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub symbol: String,
    #[serde(default)]
    pub bids: Vec<BookLevel>,
    #[serde(default)]
    pub asks: Vec<BookLevel>,
    pub checksum: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl BookRecord {
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }

    pub fn bid_prices(&self) -> Vec<f64> {
        self.bids.iter().map(|l| l.price).collect()
    }

    pub fn ask_prices(&self) -> Vec<f64> {
        self.asks.iter().map(|l| l.price).collect()
    }
}

/// OHLC candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleRecord {
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub trades: u64,
    pub volume: f64,
    pub vwap: f64,
    /// RFC 3339 start of the candle interval.
    pub interval_begin: String,
    /// Interval in minutes.
    pub interval: u32,
    /// RFC 3339 time of the update.
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

/// Executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub side: TradeSide,
    pub qty: f64,
    pub price: f64,
    pub ord_type: OrderType,
    pub trade_id: u64,
    pub timestamp: String,
}
