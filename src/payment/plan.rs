//! Payer-side payment plan: splits an amount into redundant locked parts

use crate::crypto::{Commitment, Scheme, Secret};
use crate::error::{Result, SpearError};
use crate::types::{Hash, PaymentId, Preimage};
use rand::{CryptoRng, RngCore};

use super::types::LockedPart;

/// A payment split into `parts_count + redundant_parts_count` locked parts
///
/// Any `parts_count` of the parts add up to exactly `amount`. The per-part
/// secrets never leave the plan except through a reveal.
#[derive(Clone, Debug)]
pub struct PaymentPlan {
    payment_id: PaymentId,
    key: Commitment,
    amount: u64,
    parts_count: usize,
    redundant_parts_count: usize,
    per_part_amount: u64,
    locked_amount: u64,
    set_id: Option<PaymentId>,
    parts: Vec<(Secret, LockedPart)>,
}

impl PaymentPlan {
    /// Build a plan against an invoice key
    ///
    /// `amount` must split evenly into `parts_count` parts.
    pub fn new<R: RngCore + CryptoRng + ?Sized>(
        key: &Commitment,
        amount: u64,
        parts_count: usize,
        redundant_parts_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let (per_part_amount, locked_amount) =
            split_amount(amount, parts_count, redundant_parts_count)?;
        let total_parts = total_parts(parts_count, redundant_parts_count)?;

        let payment_id = key.payment_id();
        let scheme = key.scheme();
        let set_id = match scheme {
            Scheme::SingleHashLock => Some(Hash(Preimage::random(rng).0)),
            Scheme::HashLock | Scheme::PointLock => None,
        };

        let mut parts = Vec::new();
        parts.try_reserve_exact(total_parts).map_err(|_| {
            SpearError::InvalidInput(format!("cannot allocate {} parts", total_parts))
        })?;
        for _ in 0..total_parts {
            let secret = scheme.generate(rng);
            let lock = part_lock(key, &secret)?;
            parts.push((
                secret,
                LockedPart {
                    amount: per_part_amount,
                    payment_id,
                    lock,
                    set_id,
                },
            ));
        }

        Ok(Self {
            payment_id,
            key: *key,
            amount,
            parts_count,
            redundant_parts_count,
            per_part_amount,
            locked_amount,
            set_id,
            parts,
        })
    }

    pub fn payment_id(&self) -> PaymentId {
        self.payment_id
    }

    pub fn key(&self) -> &Commitment {
        &self.key
    }

    pub fn scheme(&self) -> Scheme {
        self.key.scheme()
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn parts_count(&self) -> usize {
        self.parts_count
    }

    pub fn redundant_parts_count(&self) -> usize {
        self.redundant_parts_count
    }

    pub fn per_part_amount(&self) -> u64 {
        self.per_part_amount
    }

    pub fn locked_amount(&self) -> u64 {
        self.locked_amount
    }

    /// Random payment attempt id, set for single hash locks
    pub fn set_id(&self) -> Option<PaymentId> {
        self.set_id
    }

    /// All locked parts, in creation order
    pub fn locked_parts(&self) -> Vec<LockedPart> {
        self.parts.iter().map(|(_, part)| part.clone()).collect()
    }

    /// Secret behind `part`, matched on its lock commitment
    pub fn secret_for(&self, part: &LockedPart) -> Option<&Secret> {
        self.parts
            .iter()
            .find(|(_, own)| own.lock == part.lock && own.amount == part.amount)
            .map(|(secret, _)| secret)
    }
}

/// `(per_part_amount, locked_amount)` for a split
pub fn split_amount(
    amount: u64,
    parts_count: usize,
    redundant_parts_count: usize,
) -> Result<(u64, u64)> {
    if amount == 0 {
        return Err(SpearError::InvalidInput("amount must be positive".to_string()));
    }
    if parts_count == 0 {
        return Err(SpearError::InvalidInput(
            "parts_count must be at least 1".to_string(),
        ));
    }

    let parts = parts_count as u64;
    if amount % parts != 0 {
        return Err(SpearError::InvalidInput(format!(
            "amount {} does not split evenly into {} parts",
            amount, parts_count
        )));
    }

    total_parts(parts_count, redundant_parts_count)?;

    let per_part_amount = amount / parts;
    let locked_amount = per_part_amount
        .checked_mul(redundant_parts_count as u64)
        .and_then(|redundant| redundant.checked_add(amount))
        .ok_or_else(|| SpearError::InvalidInput("locked amount overflows".to_string()))?;

    Ok((per_part_amount, locked_amount))
}

fn total_parts(parts_count: usize, redundant_parts_count: usize) -> Result<usize> {
    parts_count
        .checked_add(redundant_parts_count)
        .ok_or_else(|| SpearError::InvalidInput("part count overflows".to_string()))
}

fn part_lock(key: &Commitment, secret: &Secret) -> Result<Commitment> {
    match (key, secret) {
        (Commitment::Hash(_) | Commitment::SingleHash(_), Secret::Preimage(_)) => key
            .scheme()
            .commit(secret)
            .ok_or_else(|| SpearError::InvalidInput("unusable part secret".to_string())),
        (Commitment::Point(invoice_point), Secret::Scalar(scalar)) => invoice_point
            .offset_by(scalar)
            .map(Commitment::Point)
            .ok_or_else(|| SpearError::InvalidInput("invoice point does not decode".to_string())),
        _ => Err(SpearError::InvalidInput(
            "part secret does not match invoice scheme".to_string(),
        )),
    }
}
