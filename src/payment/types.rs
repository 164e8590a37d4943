//! Payment data model: invoices, locked parts and claim receipts

use crate::crypto::{Commitment, Scheme, Secret};
use crate::types::PaymentId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A locked fragment of a payment, forwarded from payer to payee
///
/// `payment_id` always names the invoice being paid. `lock` is the per-part
/// commitment: the payer hash for hash locks, the offset invoice point for
/// point locks. Equality is structural, which is what receipt dedup keys on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockedPart {
    pub amount: u64,
    pub payment_id: PaymentId,
    pub lock: Commitment,
    /// Payment attempt the part belongs to; single hash locks only
    #[serde(default)]
    pub set_id: Option<PaymentId>,
}

impl LockedPart {
    /// Per-part identifier, distinct for every part of a payment
    pub fn lock_id(&self) -> PaymentId {
        self.lock.payment_id()
    }
}

/// What the payee hands to the payer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTicket {
    pub payment_id: PaymentId,
    /// Commitment the payer locks against: payment hash or invoice point
    pub key: Commitment,
    pub amount: u64,
}

/// Result of a successful claim
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub payment_id: PaymentId,
    pub amount: u64,
    pub parts: usize,
    /// False when this call repeated an earlier identical claim
    pub newly_claimed: bool,
    /// Point locks only: `root + part_secret` for each claimed part, in order
    pub combined_secrets: Vec<Secret>,
}

/// Invoice lifecycle
#[derive(Clone, Debug)]
pub enum InvoiceState {
    Open,
    Claimed {
        parts: HashSet<LockedPart>,
        receipt: ClaimReceipt,
    },
}

/// Payee-side invoice
#[derive(Clone, Debug)]
pub struct Invoice {
    root_secret: Secret,
    key: Commitment,
    amount: u64,
    state: InvoiceState,
}

impl Invoice {
    /// Build an invoice around a freshly drawn root secret
    pub fn new(scheme: Scheme, root_secret: Secret, amount: u64) -> Option<Self> {
        let key = scheme.commit(&root_secret)?;
        Some(Self {
            root_secret,
            key,
            amount,
            state: InvoiceState::Open,
        })
    }

    pub fn payment_id(&self) -> PaymentId {
        self.key.payment_id()
    }

    pub fn key(&self) -> &Commitment {
        &self.key
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub(crate) fn root_secret(&self) -> &Secret {
        &self.root_secret
    }

    pub fn state(&self) -> &InvoiceState {
        &self.state
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self.state, InvoiceState::Claimed { .. })
    }

    pub(crate) fn mark_claimed(&mut self, parts: HashSet<LockedPart>, receipt: ClaimReceipt) {
        self.state = InvoiceState::Claimed { parts, receipt };
    }

    pub fn ticket(&self) -> InvoiceTicket {
        InvoiceTicket {
            payment_id: self.payment_id(),
            key: self.key,
            amount: self.amount,
        }
    }
}
