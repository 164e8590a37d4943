//! Invoices, payment plans and the node ledger

pub mod balance;
pub mod node;
pub mod plan;
pub mod types;

pub use balance::Balance;
pub use node::{Node, SecretSource};
pub use plan::{split_amount, PaymentPlan};
pub use types::{ClaimReceipt, Invoice, InvoiceState, InvoiceTicket, LockedPart};
