//! Per-channel business rules.
//!
//! Each check returns every violation found in a record instead of stopping
//! at the first one, so a report can list them all.

use crate::validators::{
    ohlc_violations, parse_rfc3339, validate_book_not_crossed, validate_non_negative,
    validate_positive, validate_price_ordering,
};
use crate::{PriceOrder, ValidationError, ValidationResult};
use streamprobe_core::{BookRecord, CandleRecord, TickerRecord, TradeRecord};

/// Allowed drift between a candle's span and its interval, in seconds.
pub const CANDLE_SPAN_TOLERANCE_SECS: f64 = 1.0;

fn collect(violations: &mut Vec<ValidationError>, result: ValidationResult) {
    if let Err(e) = result {
        violations.push(e);
    }
}

/// Ticker rules. `subscribed` lists the symbols the stream was opened for.
pub fn check_ticker<S: AsRef<str>>(record: &TickerRecord, subscribed: &[S]) -> Vec<ValidationError> {
    let mut v = Vec::new();

    if !subscribed.iter().any(|s| s.as_ref() == record.symbol) {
        let expected: Vec<&str> = subscribed.iter().map(AsRef::as_ref).collect();
        v.push(ValidationError::mismatch(
            "symbol",
            expected.join(","),
            &record.symbol,
        ));
    }

    collect(&mut v, validate_positive(record.bid, "bid"));
    collect(&mut v, validate_positive(record.ask, "ask"));
    collect(&mut v, validate_positive(record.last, "last"));
    collect(&mut v, validate_positive(record.bid_qty, "bid_qty"));
    collect(&mut v, validate_positive(record.ask_qty, "ask_qty"));
    collect(&mut v, validate_non_negative(record.volume, "volume"));
    collect(&mut v, validate_positive(record.vwap, "vwap"));
    collect(&mut v, validate_positive(record.low, "low"));
    collect(&mut v, validate_positive(record.high, "high"));

    if record.bid >= record.ask {
        v.push(ValidationError::relation("bid", record.bid, "<", "ask", record.ask));
    }
    if record.low > record.high {
        v.push(ValidationError::relation("low", record.low, "<=", "high", record.high));
    }
    v
}

/// Snapshot rules. With `expected_depth`, each side must hold exactly that
/// many levels. The checksum must be non-zero; its value is not verified here.
pub fn check_book_snapshot(record: &BookRecord, expected_depth: Option<usize>) -> Vec<ValidationError> {
    let mut v = Vec::new();

    if record.bids.is_empty() {
        v.push(ValidationError::Empty { field: "bids" });
    }
    if record.asks.is_empty() {
        v.push(ValidationError::Empty { field: "asks" });
    }
    if let Some(depth) = expected_depth {
        if record.bids.len() != depth {
            v.push(ValidationError::mismatch("bids depth", depth, record.bids.len()));
        }
        if record.asks.len() != depth {
            v.push(ValidationError::mismatch("asks depth", depth, record.asks.len()));
        }
    }

    for level in &record.bids {
        collect(&mut v, validate_positive(level.price, "bid price"));
        collect(&mut v, validate_positive(level.qty, "bid qty"));
    }
    for level in &record.asks {
        collect(&mut v, validate_positive(level.price, "ask price"));
        collect(&mut v, validate_positive(level.qty, "ask qty"));
    }

    collect(&mut v, validate_positive(f64::from(record.checksum), "checksum"));

    let bids = record.bid_prices();
    let asks = record.ask_prices();
    collect(&mut v, validate_price_ordering(&bids, PriceOrder::Descending, true));
    collect(&mut v, validate_price_ordering(&asks, PriceOrder::Ascending, true));
    collect(&mut v, validate_book_not_crossed(&bids, &asks));
    v
}

/// Candle rules. `expected_interval` is the subscribed interval in minutes.
pub fn check_candle(record: &CandleRecord, expected_interval: u32) -> Vec<ValidationError> {
    let mut v = ohlc_violations(record.open, record.high, record.low, record.close);

    collect(&mut v, validate_positive(record.open, "open"));
    collect(&mut v, validate_positive(record.high, "high"));
    collect(&mut v, validate_positive(record.low, "low"));
    collect(&mut v, validate_positive(record.close, "close"));
    collect(&mut v, validate_non_negative(record.volume, "volume"));
    collect(&mut v, validate_positive(record.vwap, "vwap"));

    if record.interval != expected_interval {
        v.push(ValidationError::mismatch("interval", expected_interval, record.interval));
    }

    match (
        parse_rfc3339(&record.interval_begin),
        parse_rfc3339(&record.timestamp),
    ) {
        (Ok(begin), Ok(ts)) => {
            let span = (ts - begin).num_milliseconds() as f64 / 1000.0;
            if span <= 0.0 {
                v.push(ValidationError::relation(
                    "interval_begin",
                    begin.timestamp() as f64,
                    "<",
                    "timestamp",
                    ts.timestamp() as f64,
                ));
            }
            let expected_span = f64::from(record.interval) * 60.0;
            if (span - expected_span).abs() > CANDLE_SPAN_TOLERANCE_SECS {
                v.push(ValidationError::mismatch(
                    "candle span",
                    format!("{}s", expected_span),
                    format!("{}s", span),
                ));
            }
        }
        (Err(e), _) | (_, Err(e)) => v.push(e),
    }
    v
}

/// Trade rules for a stream subscribed to `symbol`.
pub fn check_trade(record: &TradeRecord, symbol: &str) -> Vec<ValidationError> {
    let mut v = Vec::new();
    if record.symbol != symbol {
        v.push(ValidationError::mismatch("symbol", symbol, &record.symbol));
    }
    collect(&mut v, validate_positive(record.qty, "qty"));
    collect(&mut v, validate_positive(record.price, "price"));
    if record.trade_id == 0 {
        v.push(ValidationError::NotPositive {
            field: "trade_id",
            value: 0.0,
        });
    }
    if let Err(e) = parse_rfc3339(&record.timestamp) {
        v.push(e);
    }
    v
}
