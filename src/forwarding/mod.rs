//! Payer → payee forwarding

pub mod courier;
pub mod message;

pub use courier::{sample_parts, Courier};
pub use message::ForwardMessage;
