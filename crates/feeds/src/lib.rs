//! Streaming session over an exchange's public WebSocket API.
//!
//! ## Architecture
//!
//! - `transport` - text-frame connections (`WsTransport`, in-memory `MemoryTransport`)
//! - `session` - `SubscriptionSession`: subscribe, acknowledge, stream, unsubscribe
//! - `fixture` - recording and replaying captured messages

pub mod config;
pub mod error;
pub mod fixture;
pub mod session;
pub mod transport;

pub use config::*;
pub use error::*;
pub use fixture::*;
pub use session::*;
pub use transport::*;
