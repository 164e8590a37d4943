//! Commitment schemes backing locked payment parts
//!
//! Two strategies share one interface:
//! - [`HashLock`]: SHA-256 over a 32-byte preimage.
//! - [`PointLock`]: scalar multiplication of the Ristretto base point. Secrets
//!   add in the scalar field and commitments add in the group, so
//!   `commit(a + b) == commit(a) + commit(b)`.

use crate::types::{Hash, Preimage};
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};

/// Commit to a secret and check openings
pub trait CommitmentScheme {
    type Secret;
    type Commitment: PartialEq;

    /// Draw a fresh secret
    fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self::Secret;

    /// Deterministic commitment to `secret`
    fn commit(secret: &Self::Secret) -> Self::Commitment;

    /// True iff `secret` opens `commitment`
    fn verify(commitment: &Self::Commitment, secret: &Self::Secret) -> bool {
        Self::commit(secret) == *commitment
    }
}

/// Schemes whose secrets and commitments can be added
pub trait Homomorphic: CommitmentScheme {
    fn combine(a: &Self::Secret, b: &Self::Secret) -> Self::Secret;

    /// Inverse of [`Homomorphic::combine`]: `separate(combine(a, b), b) == a`
    fn separate(combined: &Self::Secret, b: &Self::Secret) -> Self::Secret;

    fn combine_commitments(a: &Self::Commitment, b: &Self::Commitment) -> Self::Commitment;
}

/// Hash lock: commitment = SHA-256(preimage)
pub struct HashLock;

impl CommitmentScheme for HashLock {
    type Secret = Preimage;
    type Commitment = Hash;

    fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Preimage {
        Preimage::random(rng)
    }

    fn commit(secret: &Preimage) -> Hash {
        secret.hash()
    }
}

/// Point lock: commitment = secret·G on Ristretto
pub struct PointLock;

impl CommitmentScheme for PointLock {
    type Secret = Scalar;
    type Commitment = RistrettoPoint;

    fn generate<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Scalar {
        let mut wide = [0u8; 64];
        rng.fill_bytes(&mut wide);
        Scalar::from_bytes_mod_order_wide(&wide)
    }

    fn commit(secret: &Scalar) -> RistrettoPoint {
        RistrettoPoint::mul_base(secret)
    }
}

impl Homomorphic for PointLock {
    fn combine(a: &Scalar, b: &Scalar) -> Scalar {
        a + b
    }

    fn separate(combined: &Scalar, b: &Scalar) -> Scalar {
        combined - b
    }

    fn combine_commitments(a: &RistrettoPoint, b: &RistrettoPoint) -> RistrettoPoint {
        a + b
    }
}
