//! Structural and business-logic checks for streamed market data.
//!
//! - `schema` - typed structural validation of raw JSON messages
//! - `validators` - generic predicates (timestamps, ordering, OHLC, positivity)
//! - `integrity` - per-channel rule sets that collect every violation
//! - `checksum` - order book CRC32 recomputation

pub mod checksum;
pub mod error;
pub mod integrity;
pub mod schema;
pub mod validators;

pub use checksum::*;
pub use error::*;
pub use integrity::*;
pub use schema::*;
pub use validators::*;
