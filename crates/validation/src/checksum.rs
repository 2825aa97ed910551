//! Order book CRC32 checksum.
//!
//! For the top 10 asks (best first) followed by the top 10 bids (best first),
//! each level contributes its price digits then its quantity digits: the
//! decimal text with the point removed and leading zeros stripped. The CRC32
//! of the concatenation is compared against the `checksum` field.
//!
//! Levels arrive as JSON numbers, so the original decimal text is not
//! available. Without a known precision the shortest representation is used,
//! which drops trailing zeros and can disagree with the remote value. A
//! mismatch is reported, never treated as a failure.

use streamprobe_core::{BookLevel, BookRecord};

/// Number of levels per side covered by the checksum.
pub const CHECKSUM_DEPTH: usize = 10;

/// Decimal precision used to render levels. `None` means shortest form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecksumPrecision {
    pub price_decimals: Option<usize>,
    pub qty_decimals: Option<usize>,
}

impl ChecksumPrecision {
    pub fn new(price_decimals: usize, qty_decimals: usize) -> Self {
        Self {
            price_decimals: Some(price_decimals),
            qty_decimals: Some(qty_decimals),
        }
    }
}

/// Result of comparing a recomputed checksum with the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumOutcome {
    Match,
    Mismatch { expected: u32, calculated: u32 },
}

impl ChecksumOutcome {
    pub fn is_match(self) -> bool {
        matches!(self, ChecksumOutcome::Match)
    }
}

fn digits(value: f64, decimals: Option<usize>) -> String {
    let text = match decimals {
        Some(d) => format!("{:.*}", d, value),
        None => format!("{}", value),
    };
    let without_point: String = text.chars().filter(|c| *c != '.').collect();
    let trimmed = without_point.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The string that is fed into CRC32.
pub fn checksum_input(bids: &[BookLevel], asks: &[BookLevel], precision: ChecksumPrecision) -> String {
    let mut out = String::new();
    for level in asks.iter().take(CHECKSUM_DEPTH).chain(bids.iter().take(CHECKSUM_DEPTH)) {
        out.push_str(&digits(level.price, precision.price_decimals));
        out.push_str(&digits(level.qty, precision.qty_decimals));
    }
    out
}

pub fn book_checksum(bids: &[BookLevel], asks: &[BookLevel], precision: ChecksumPrecision) -> u32 {
    crc32fast::hash(checksum_input(bids, asks, precision).as_bytes())
}

/// Recompute the checksum of `book` and compare it with the remote value.
pub fn verify_checksum(book: &BookRecord, precision: ChecksumPrecision) -> ChecksumOutcome {
    let calculated = book_checksum(&book.bids, &book.asks, precision);
    if calculated == book.checksum {
        ChecksumOutcome::Match
    } else {
        ChecksumOutcome::Mismatch {
            expected: book.checksum,
            calculated,
        }
    }
}
