//! Generic predicates shared by the per-channel rule sets.

use crate::{PriceOrder, ValidationError, ValidationResult};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Allowed clock skew for timestamps from the remote service, in seconds.
pub const MAX_CLOCK_SKEW_SECS: f64 = 60.0;

/// Parse an RFC 3339 timestamp (`2024-01-01T00:00:00.000000Z`).
pub fn parse_rfc3339(ts: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidTimestamp(format!("{} - {}", ts, e)))
}

/// Convert a timestamp value to Unix seconds.
///
/// Accepts JSON numbers, numeric strings and RFC 3339 strings.
pub fn timestamp_secs(ts: &Value) -> Result<f64, ValidationError> {
    match ts {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::InvalidTimestamp(n.to_string())),
        Value::String(s) => match s.parse::<f64>() {
            Ok(secs) => Ok(secs),
            Err(_) => parse_rfc3339(s).map(|dt| dt.timestamp_micros() as f64 / 1_000_000.0),
        },
        other => Err(ValidationError::InvalidTimestamp(other.to_string())),
    }
}

/// Validate a timestamp against the current wall clock.
pub fn validate_timestamp(ts: &Value, allow_future: bool) -> Result<f64, ValidationError> {
    let now = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
    validate_timestamp_at(ts, allow_future, now)
}

/// Validate a timestamp: positive, and not beyond `now` plus the allowed skew
/// unless `allow_future` is set. Returns the timestamp in Unix seconds.
pub fn validate_timestamp_at(ts: &Value, allow_future: bool, now: f64) -> Result<f64, ValidationError> {
    let secs = timestamp_secs(ts)?;
    if secs <= 0.0 {
        return Err(ValidationError::InvalidTimestamp(format!(
            "{} - must be positive",
            ts
        )));
    }
    if !allow_future && secs > now + MAX_CLOCK_SKEW_SECS {
        return Err(ValidationError::FutureTimestamp { ts: secs, now });
    }
    Ok(secs)
}

/// Timestamps must be strictly increasing.
pub fn validate_timestamps_increasing(timestamps: &[f64]) -> ValidationResult {
    for (index, pair) in timestamps.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(ValidationError::NotIncreasing {
                index: index + 1,
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

/// Best bid must be strictly below best ask. An empty side is not crossed.
pub fn validate_book_not_crossed(bids: &[f64], asks: &[f64]) -> ValidationResult {
    let (Some(&best_bid), Some(&best_ask)) = (bids.first(), asks.first()) else {
        return Ok(());
    };
    if best_bid >= best_ask {
        return Err(ValidationError::CrossedBook { best_bid, best_ask });
    }
    Ok(())
}

/// Prices must follow `order`. With `strict`, equal neighbours are rejected.
pub fn validate_price_ordering(prices: &[f64], order: PriceOrder, strict: bool) -> ValidationResult {
    for (index, pair) in prices.windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        let ok = match (order, strict) {
            (PriceOrder::Descending, false) => next <= prev,
            (PriceOrder::Descending, true) => next < prev,
            (PriceOrder::Ascending, false) => next >= prev,
            (PriceOrder::Ascending, true) => next > prev,
        };
        if !ok {
            return Err(ValidationError::PriceOrdering {
                order,
                index: index + 1,
                prev,
                next,
            });
        }
    }
    Ok(())
}

/// Candle invariants: low is the minimum and high the maximum of the four prices.
pub fn validate_ohlc_relationships(open: f64, high: f64, low: f64, close: f64) -> ValidationResult {
    ohlc_violations(open, high, low, close)
        .into_iter()
        .next()
        .map_or(Ok(()), Err)
}

/// Every OHLC relationship that does not hold.
pub fn ohlc_violations(open: f64, high: f64, low: f64, close: f64) -> Vec<ValidationError> {
    let mut violations = Vec::new();
    if low > open {
        violations.push(ValidationError::relation("low", low, "<=", "open", open));
    }
    if low > close {
        violations.push(ValidationError::relation("low", low, "<=", "close", close));
    }
    if low > high {
        violations.push(ValidationError::relation("low", low, "<=", "high", high));
    }
    if high < open {
        violations.push(ValidationError::relation("high", high, ">=", "open", open));
    }
    if high < close {
        violations.push(ValidationError::relation("high", high, ">=", "close", close));
    }
    violations
}

pub fn validate_positive(value: f64, field: &'static str) -> ValidationResult {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

pub fn validate_non_negative(value: f64, field: &'static str) -> ValidationResult {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Negative { field, value })
    }
}
