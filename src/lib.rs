//! Spear payment library
//!
//! Redundant multipath payments: a payer splits an invoice across more
//! locked parts than needed, the payee claims with the first sufficient set,
//! and the claim yields a proof of payment.
//!
//! Three lock schemes are supported:
//! - Hash locks (SHA-256 preimages) with a two-stage per-part lock
//! - Single hash locks, one payer preimage per part grouped by set id
//! - Point locks (Ristretto scalars) where part secrets add up to the proof

pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod forwarding;
pub mod payment;
pub mod types;

// Re-export commonly used types
pub use config::ProtocolConfig;
pub use crypto::{Commitment, PaymentProof, Scheme, Secret};
pub use error::{Result, SpearError};
pub use payment::{ClaimReceipt, InvoiceTicket, LockedPart, Node};
pub use types::{Hash, PaymentId, Preimage};
