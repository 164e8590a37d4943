//! Node ledger: the payer and payee sides of the protocol
//!
//! One `Node` can act as payer, payee, or both. All mutable state lives
//! behind a single mutex so every check-then-mutate step is atomic with
//! respect to other callers on the same node.

use crate::crypto::{Commitment, PaymentProof, Scheme, Secret};
use crate::error::{Result, SpearError};
use crate::types::PaymentId;
use parking_lot::Mutex;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::collections::{HashMap, HashSet};

use super::balance::Balance;
use super::plan::{split_amount, PaymentPlan};
use super::types::{ClaimReceipt, Invoice, InvoiceState, InvoiceTicket, LockedPart};

/// Randomness a node draws secrets from
pub trait SecretSource: RngCore + CryptoRng + Send {}

impl<T: RngCore + CryptoRng + Send> SecretSource for T {}

#[derive(Default)]
struct NodeState {
    balance: Balance,
    invoices: HashMap<PaymentId, Invoice>,
    payments: HashMap<PaymentId, PaymentPlan>,
    received: HashMap<PaymentId, Vec<LockedPart>>,
    received_index: HashSet<LockedPart>,
}

/// A payer/payee node
pub struct Node {
    state: Mutex<NodeState>,
    rng: Mutex<Box<dyn SecretSource>>,
}

impl Node {
    /// Create a node drawing secrets from the OS RNG
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }

    /// Create a node with an injected secret source
    pub fn with_rng<R: SecretSource + 'static>(rng: R) -> Self {
        Self {
            state: Mutex::new(NodeState::default()),
            rng: Mutex::new(Box::new(rng)),
        }
    }

    // ------------------------------------------------------------------
    // Balance
    // ------------------------------------------------------------------

    pub fn balance(&self) -> Balance {
        self.state.lock().balance
    }

    /// Credit available balance
    pub fn deposit(&self, amount: u64) -> Result<()> {
        self.state.lock().balance.deposit(amount)
    }

    pub fn lock_balance(&self, amount: u64) -> Result<()> {
        self.state.lock().balance.lock(amount)
    }

    pub fn unlock_balance(&self, amount: u64) -> Result<()> {
        self.state.lock().balance.unlock(amount)
    }

    // ------------------------------------------------------------------
    // Payee
    // ------------------------------------------------------------------

    /// Create an invoice and return the public half for the payer
    pub fn new_invoice(&self, amount: u64, scheme: Scheme) -> Result<InvoiceTicket> {
        if amount == 0 {
            return Err(SpearError::InvalidInput("amount must be positive".to_string()));
        }

        let root = scheme.generate(&mut **self.rng.lock());
        let invoice = Invoice::new(scheme, root, amount)
            .ok_or_else(|| SpearError::InvalidInput("unusable invoice secret".to_string()))?;
        let ticket = invoice.ticket();

        self.state.lock().invoices.insert(ticket.payment_id, invoice);

        tracing::info!(
            "Created {} invoice {} for {}",
            scheme,
            ticket.payment_id.short(),
            amount
        );
        Ok(ticket)
    }

    /// Store incoming parts, ignoring ones already held
    ///
    /// Parts for invoices this node never issued are dropped. Returns how
    /// many parts were new.
    pub fn receive_parts(&self, parts: &[LockedPart]) -> usize {
        let mut state = self.state.lock();
        let mut added = 0;
        for part in parts {
            if !state.invoices.contains_key(&part.payment_id) {
                tracing::warn!(
                    "Dropped part {} for unknown invoice {}",
                    part.lock_id().short(),
                    part.payment_id.short()
                );
                continue;
            }
            if state.received_index.insert(part.clone()) {
                state
                    .received
                    .entry(part.payment_id)
                    .or_default()
                    .push(part.clone());
                added += 1;
                tracing::debug!(
                    "Received part {} of payment {}",
                    part.lock_id().short(),
                    part.payment_id.short()
                );
            }
        }
        added
    }

    /// Parts covering the invoice amount exactly, or `None` while short
    ///
    /// Parts are accumulated per set in arrival order and the first prefix
    /// that hits the invoice amount is returned. Jumping past the amount
    /// without hitting it is an `AmountMismatch`. Only single hash locks
    /// carry set ids; every other part lands in the same set.
    pub fn get_received_parts(&self, payment_id: &PaymentId) -> Result<Option<Vec<LockedPart>>> {
        let state = self.state.lock();
        let invoice = state
            .invoices
            .get(payment_id)
            .ok_or_else(|| SpearError::InvoiceNotFound(payment_id.to_hex()))?;

        let mut sets: HashMap<Option<PaymentId>, (Vec<LockedPart>, u64)> = HashMap::new();
        let mut received = 0;
        for part in state.received.get(payment_id).into_iter().flatten() {
            received += 1;
            let (parts, total) = sets.entry(part.set_id).or_default();
            parts.push(part.clone());
            *total = total.saturating_add(part.amount);
            let total = *total;
            if total == invoice.amount() {
                return Ok(Some(std::mem::take(parts)));
            }
            if total > invoice.amount() {
                tracing::warn!(
                    "Received parts for {} overshoot invoice: {} > {}",
                    payment_id.short(),
                    total,
                    invoice.amount()
                );
                return Err(SpearError::AmountMismatch {
                    expected: invoice.amount(),
                    actual: total,
                });
            }
        }

        tracing::debug!(
            "Not enough parts for {}: {} received in {} sets, invoice {}",
            payment_id.short(),
            received,
            sets.len(),
            invoice.amount()
        );
        Ok(None)
    }

    /// Verify revealed secrets and settle the invoice
    ///
    /// Settles at most once. Repeating the same claim returns the stored
    /// receipt; a different part set after settlement is rejected.
    pub fn claim(&self, parts: &[LockedPart], secrets: &[Secret]) -> Result<ClaimReceipt> {
        if secrets.len() != parts.len() {
            return Err(SpearError::SecretCountMismatch {
                parts: parts.len(),
                secrets: secrets.len(),
            });
        }
        let payment_id = shared_payment_id(parts)?;

        let mut state = self.state.lock();
        let invoice = state
            .invoices
            .get_mut(&payment_id)
            .ok_or_else(|| SpearError::InvoiceNotFound(payment_id.to_hex()))?;

        let total = total_amount(parts);
        if total != invoice.amount() {
            return Err(SpearError::AmountMismatch {
                expected: invoice.amount(),
                actual: total,
            });
        }

        let combined_secrets = verify_claim(invoice, parts, secrets)?;
        let claimed: HashSet<LockedPart> = parts.iter().cloned().collect();

        if let InvoiceState::Claimed { parts: settled, receipt } = invoice.state() {
            if *settled == claimed {
                // same parts, possibly reordered: answer in this call's order
                return Ok(ClaimReceipt {
                    newly_claimed: false,
                    combined_secrets,
                    ..receipt.clone()
                });
            }
            tracing::warn!("Rejected second claim on {}", payment_id.short());
            return Err(SpearError::AlreadyClaimed(payment_id.to_hex()));
        }

        let receipt = ClaimReceipt {
            payment_id,
            amount: invoice.amount(),
            parts: parts.len(),
            newly_claimed: true,
            combined_secrets,
        };
        invoice.mark_claimed(claimed, receipt.clone());

        tracing::info!(
            "Claimed payment {} with {} parts",
            payment_id.short(),
            parts.len()
        );
        Ok(receipt)
    }

    /// Invoice root secret as proof of payment, once claimed
    pub fn get_proof(&self, payment_id: &PaymentId) -> Result<PaymentProof> {
        let state = self.state.lock();
        let invoice = state
            .invoices
            .get(payment_id)
            .ok_or_else(|| SpearError::InvoiceNotFound(payment_id.to_hex()))?;
        if !invoice.is_claimed() {
            return Err(SpearError::InvoiceNotClaimed(payment_id.to_hex()));
        }
        Ok(PaymentProof(invoice.root_secret().clone()))
    }

    pub fn invoice(&self, payment_id: &PaymentId) -> Option<InvoiceTicket> {
        self.state.lock().invoices.get(payment_id).map(Invoice::ticket)
    }

    pub fn is_claimed(&self, payment_id: &PaymentId) -> bool {
        self.state
            .lock()
            .invoices
            .get(payment_id)
            .map(Invoice::is_claimed)
            .unwrap_or(false)
    }

    /// Number of distinct parts held
    pub fn received_count(&self) -> usize {
        self.state.lock().received_index.len()
    }

    // ------------------------------------------------------------------
    // Payer
    // ------------------------------------------------------------------

    /// Split a payment into redundant locked parts and lock the funds
    pub fn pay(
        &self,
        key: &Commitment,
        amount: u64,
        parts_count: usize,
        redundant_parts_count: usize,
    ) -> Result<Vec<LockedPart>> {
        let (_, locked_amount) = split_amount(amount, parts_count, redundant_parts_count)?;
        let payment_id = key.payment_id();

        // Everything that can fail cheaply is checked before parts are drawn
        let mut state = self.state.lock();
        if state.payments.contains_key(&payment_id) {
            return Err(SpearError::PaymentExists(payment_id.to_hex()));
        }
        if state.balance.available < locked_amount {
            return Err(SpearError::InsufficientBalance {
                required: locked_amount,
                available: state.balance.available,
            });
        }

        let plan = {
            let mut rng = self.rng.lock();
            PaymentPlan::new(key, amount, parts_count, redundant_parts_count, &mut **rng)?
        };
        state.balance.lock(plan.locked_amount())?;

        let parts = plan.locked_parts();
        tracing::info!(
            "Locked {} for payment {}: {} + {} redundant parts of {}",
            plan.locked_amount(),
            payment_id.short(),
            plan.parts_count(),
            plan.redundant_parts_count(),
            plan.per_part_amount()
        );
        state.payments.insert(payment_id, plan);
        Ok(parts)
    }

    /// Reveal per-part secrets for a set of parts covering the amount exactly
    pub fn reveal(&self, parts: &[LockedPart]) -> Result<Vec<Secret>> {
        let payment_id = shared_payment_id(parts)?;

        let state = self.state.lock();
        let plan = state
            .payments
            .get(&payment_id)
            .ok_or_else(|| SpearError::PaymentNotFound(payment_id.to_hex()))?;

        let total = total_amount(parts);
        if total != plan.amount() {
            tracing::warn!(
                "Refusing to reveal {}: parts total {} != {}",
                payment_id.short(),
                total,
                plan.amount()
            );
            return Err(SpearError::AmountMismatch {
                expected: plan.amount(),
                actual: total,
            });
        }

        let secrets = parts
            .iter()
            .map(|part| {
                plan.secret_for(part)
                    .cloned()
                    .ok_or_else(|| SpearError::SecretNotFound(part.lock_id().to_hex()))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Revealed {} secrets for payment {}",
            secrets.len(),
            payment_id.short()
        );
        Ok(secrets)
    }

    /// Recover the point-lock payment proof from the payee's claim receipt
    pub fn derive_proof(&self, parts: &[LockedPart], receipt: &ClaimReceipt) -> Result<PaymentProof> {
        let payment_id = shared_payment_id(parts)?;
        if receipt.payment_id != payment_id {
            return Err(SpearError::MixedPayment);
        }

        let state = self.state.lock();
        let plan = state
            .payments
            .get(&payment_id)
            .ok_or_else(|| SpearError::PaymentNotFound(payment_id.to_hex()))?;
        if plan.scheme() != Scheme::PointLock {
            return Err(SpearError::UnsupportedOperation(
                "hash-lock proofs come from the payee".to_string(),
            ));
        }

        let own_secrets = parts
            .iter()
            .map(|part| {
                plan.secret_for(part)
                    .cloned()
                    .ok_or_else(|| SpearError::SecretNotFound(part.lock_id().to_hex()))
            })
            .collect::<Result<Vec<_>>>()?;

        let proof = PaymentProof::from_claim(&receipt.combined_secrets, &own_secrets)?;
        if !proof.verify(plan.key()) {
            return Err(SpearError::ProofInconsistency);
        }
        Ok(proof)
    }

    /// Locked parts of an outgoing payment
    pub fn payment_parts(&self, payment_id: &PaymentId) -> Option<Vec<LockedPart>> {
        self.state
            .lock()
            .payments
            .get(payment_id)
            .map(PaymentPlan::locked_parts)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Common payment identifier of a non-empty, duplicate-free part list
fn shared_payment_id(parts: &[LockedPart]) -> Result<PaymentId> {
    let first = parts
        .first()
        .ok_or_else(|| SpearError::InvalidInput("no parts supplied".to_string()))?;
    if parts
        .iter()
        .any(|part| part.payment_id != first.payment_id || part.set_id != first.set_id)
    {
        return Err(SpearError::MixedPayment);
    }

    let distinct: HashSet<&LockedPart> = parts.iter().collect();
    if distinct.len() != parts.len() {
        return Err(SpearError::InvalidInput("duplicate part supplied".to_string()));
    }
    Ok(first.payment_id)
}

fn total_amount(parts: &[LockedPart]) -> u64 {
    parts
        .iter()
        .fold(0u64, |acc, part| acc.saturating_add(part.amount))
}

/// Check each secret against its part and the invoice root
///
/// Returns the combined scalars for point locks, nothing for hash locks.
fn verify_claim(invoice: &Invoice, parts: &[LockedPart], secrets: &[Secret]) -> Result<Vec<Secret>> {
    let root = invoice.root_secret();
    let mut combined_secrets = Vec::new();

    for (index, (part, secret)) in parts.iter().zip(secrets).enumerate() {
        tracing::debug!(
            "Verify part {} payment {} lock {}",
            index,
            part.payment_id.short(),
            part.lock_id().short()
        );
        if part.lock.scheme() != invoice.key().scheme() {
            return Err(SpearError::InvalidSecret { index });
        }
        match invoice.key() {
            Commitment::Hash(_) => {
                let root_ok = Commitment::Hash(part.payment_id).verify(root);
                if !root_ok || !part.lock.verify(secret) {
                    return Err(SpearError::InvalidSecret { index });
                }
            }
            // the part preimage alone unlocks; the invoice root is not bound
            Commitment::SingleHash(_) => {
                if !part.lock.verify(secret) {
                    return Err(SpearError::InvalidSecret { index });
                }
            }
            Commitment::Point(_) => {
                let combined = root
                    .combine(secret)
                    .map_err(|_| SpearError::InvalidSecret { index })?;
                if !part.lock.verify(&combined) {
                    return Err(SpearError::InvalidSecret { index });
                }
                combined_secrets.push(combined);
            }
        }
    }
    Ok(combined_secrets)
}
