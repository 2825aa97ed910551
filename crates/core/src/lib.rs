//! Core wire types for the streaming API harness.
//!
//! - `request` - outbound control requests (`subscribe` / `unsubscribe`)
//! - `ack` - control acknowledgments returned by the remote service
//! - `message` - inbound classification (noise, acknowledgment, data)
//! - `channel` - channel names and reserved control-plane channels
//! - `record` - typed per-channel records carried in data messages

pub mod ack;
pub mod channel;
pub mod message;
pub mod record;
pub mod request;

pub use ack::*;
pub use channel::*;
pub use message::*;
pub use record::*;
pub use request::*;
