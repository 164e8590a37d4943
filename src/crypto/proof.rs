//! Payment proofs

use crate::error::{Result, SpearError};
use serde::{Deserialize, Serialize};

use super::types::{Commitment, Secret};

/// Transferable receipt that a payment was claimed
///
/// For hash locks this is the invoice preimage; for point locks it is the
/// invoice scalar recovered from the claim. Either way anyone holding the
/// invoice key can check it with [`PaymentProof::verify`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProof(pub Secret);

impl PaymentProof {
    /// Recover the invoice scalar from a point-lock claim
    ///
    /// `combined[i]` is what the payee returned for part `i`, `part_secrets[i]`
    /// is the payer's own secret for that part. Every part must yield the
    /// same candidate.
    pub fn from_claim(combined: &[Secret], part_secrets: &[Secret]) -> Result<Self> {
        if combined.len() != part_secrets.len() {
            return Err(SpearError::SecretCountMismatch {
                parts: part_secrets.len(),
                secrets: combined.len(),
            });
        }

        let mut proof: Option<Secret> = None;
        for (claimed, own) in combined.iter().zip(part_secrets) {
            let candidate = claimed.separate(own)?;
            match &proof {
                None => proof = Some(candidate),
                Some(existing) if *existing != candidate => {
                    return Err(SpearError::ProofInconsistency)
                }
                Some(_) => {}
            }
        }

        proof
            .map(PaymentProof)
            .ok_or_else(|| SpearError::InvalidInput("no claimed parts".to_string()))
    }

    /// Check the proof against the invoice key
    pub fn verify(&self, key: &Commitment) -> bool {
        key.verify(&self.0)
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}
