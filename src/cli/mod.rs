//! CLI module for Spear

pub mod app;
pub mod commands;

pub use app::{verify_proof, PaymentOutcome, SpearApp};
pub use commands::{Cli, Commands};
