//! Error types for Spear

use thiserror::Error;

/// Main error type for Spear
#[derive(Error, Debug)]
pub enum SpearError {
    // Input validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Balance errors
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Insufficient locked balance: required {required}, locked {locked}")]
    InsufficientLockedBalance { required: u64, locked: u64 },

    // Lookup errors
    #[error("Parts are from different payments")]
    MixedPayment,

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Payment already exists: {0}")]
    PaymentExists(String),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    // Protocol errors
    #[error("Amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch { expected: u64, actual: u64 },

    #[error("Secret not found for part {0}")]
    SecretNotFound(String),

    #[error("Secret count mismatch: {parts} parts, {secrets} secrets")]
    SecretCountMismatch { parts: usize, secrets: usize },

    #[error("Invalid secret for part {index}")]
    InvalidSecret { index: usize },

    #[error("Payment proof is not consistent across parts")]
    ProofInconsistency,

    #[error("Invoice already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Invoice not claimed yet: {0}")]
    InvoiceNotClaimed(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // Forwarding errors
    #[error("Channel closed: {0}")]
    Channel(String),

    // Configuration errors
    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Result type alias for Spear operations
pub type Result<T> = std::result::Result<T, SpearError>;
