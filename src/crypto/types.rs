//! Wire-level secrets and commitments for both lock schemes

use crate::error::{Result, SpearError};
use crate::types::{decode_32, Hash, PaymentId, Preimage};
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::commitment::{CommitmentScheme, HashLock, Homomorphic, PointLock};

/// Which lock a payment uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// Two-stage hash lock: payee preimage plus per-part payer preimage
    HashLock,
    /// Single hash lock: one payer preimage per part, parts grouped by set id
    ///
    /// Claiming never touches the invoice preimage, so a claim proves the
    /// payer revealed, not that the payee was paid.
    SingleHashLock,
    /// Point lock: invoice point offset by a per-part scalar
    PointLock,
}

impl Scheme {
    /// Draw a fresh secret for this scheme
    pub fn generate<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Secret {
        match self {
            Scheme::HashLock | Scheme::SingleHashLock => Secret::Preimage(HashLock::generate(rng)),
            Scheme::PointLock => Secret::Scalar(ScalarSecret::from_scalar(&PointLock::generate(rng))),
        }
    }

    /// Commitment to `secret` under this scheme
    ///
    /// `None` when the secret belongs to the other family or is a malformed
    /// scalar.
    pub fn commit(&self, secret: &Secret) -> Option<Commitment> {
        match (self, secret) {
            (Scheme::HashLock, Secret::Preimage(preimage)) => {
                Some(Commitment::Hash(HashLock::commit(preimage)))
            }
            (Scheme::SingleHashLock, Secret::Preimage(preimage)) => {
                Some(Commitment::SingleHash(HashLock::commit(preimage)))
            }
            (Scheme::PointLock, Secret::Scalar(scalar)) => {
                PublicPoint::of(scalar).map(Commitment::Point)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::HashLock => write!(f, "hash"),
            Scheme::SingleHashLock => write!(f, "single"),
            Scheme::PointLock => write!(f, "point"),
        }
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hash" | "htlc" | "hash_lock" => Ok(Scheme::HashLock),
            "single" | "simple" | "single_hash_lock" => Ok(Scheme::SingleHashLock),
            "point" | "ptlc" | "point_lock" => Ok(Scheme::PointLock),
            other => Err(format!("unknown lock scheme '{}' (expected hash, single or point)", other)),
        }
    }
}

/// Canonical encoding of a Ristretto scalar
///
/// Bytes may come from a counterparty, so decoding is fallible and a
/// non-canonical encoding never verifies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarSecret(pub [u8; 32]);

impl ScalarSecret {
    pub fn from_scalar(scalar: &Scalar) -> Self {
        ScalarSecret(scalar.to_bytes())
    }

    pub fn to_scalar(&self) -> Option<Scalar> {
        Option::from(Scalar::from_canonical_bytes(self.0))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(hex_str: &str) -> std::result::Result<Self, hex::FromHexError> {
        Ok(ScalarSecret(decode_32(hex_str)?))
    }
}

impl fmt::Debug for ScalarSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarSecret(..)")
    }
}

/// Compressed Ristretto point
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicPoint(pub [u8; 32]);

impl PublicPoint {
    pub fn from_point(point: &RistrettoPoint) -> Self {
        PublicPoint(point.compress().to_bytes())
    }

    /// Public point of a secret scalar
    pub fn of(secret: &ScalarSecret) -> Option<Self> {
        secret
            .to_scalar()
            .map(|scalar| Self::from_point(&PointLock::commit(&scalar)))
    }

    pub fn decompress(&self) -> Option<RistrettoPoint> {
        CompressedRistretto(self.0).decompress()
    }

    /// `self + secret·G`
    pub fn offset_by(&self, secret: &ScalarSecret) -> Option<Self> {
        let base = self.decompress()?;
        let offset = PointLock::commit(&secret.to_scalar()?);
        Some(Self::from_point(&PointLock::combine_commitments(&base, &offset)))
    }

    /// Index key for this point
    pub fn payment_id(&self) -> PaymentId {
        Hash::from_bytes(&self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(hex_str: &str) -> std::result::Result<Self, hex::FromHexError> {
        Ok(PublicPoint(decode_32(hex_str)?))
    }
}

impl fmt::Display for PublicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A secret of either scheme
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Secret {
    Preimage(Preimage),
    Scalar(ScalarSecret),
}

impl Secret {
    /// Two-stage hash or point commitment, `None` for a malformed scalar
    pub fn commit(&self) -> Option<Commitment> {
        match self {
            Secret::Preimage(preimage) => Some(Commitment::Hash(HashLock::commit(preimage))),
            Secret::Scalar(scalar) => PublicPoint::of(scalar).map(Commitment::Point),
        }
    }

    /// Field addition of two point-lock secrets
    pub fn combine(&self, other: &Secret) -> Result<Secret> {
        let (a, b) = self.scalar_pair(other)?;
        Ok(Secret::Scalar(ScalarSecret::from_scalar(&PointLock::combine(&a, &b))))
    }

    /// Field subtraction, undoing [`Secret::combine`]
    pub fn separate(&self, other: &Secret) -> Result<Secret> {
        let (a, b) = self.scalar_pair(other)?;
        Ok(Secret::Scalar(ScalarSecret::from_scalar(&PointLock::separate(&a, &b))))
    }

    fn scalar_pair(&self, other: &Secret) -> Result<(Scalar, Scalar)> {
        match (self, other) {
            (Secret::Scalar(a), Secret::Scalar(b)) => {
                let a = a
                    .to_scalar()
                    .ok_or_else(|| SpearError::InvalidInput("non-canonical scalar".to_string()))?;
                let b = b
                    .to_scalar()
                    .ok_or_else(|| SpearError::InvalidInput("non-canonical scalar".to_string()))?;
                Ok((a, b))
            }
            _ => Err(SpearError::UnsupportedOperation(
                "only point-lock secrets can be combined".to_string(),
            )),
        }
    }

    pub fn to_hex(&self) -> String {
        match self {
            Secret::Preimage(preimage) => preimage.to_hex(),
            Secret::Scalar(scalar) => scalar.to_hex(),
        }
    }

    pub fn from_hex(scheme: Scheme, hex_str: &str) -> std::result::Result<Self, hex::FromHexError> {
        match scheme {
            Scheme::HashLock | Scheme::SingleHashLock => {
                Preimage::from_hex(hex_str).map(Secret::Preimage)
            }
            Scheme::PointLock => ScalarSecret::from_hex(hex_str).map(Secret::Scalar),
        }
    }
}

/// A commitment of either scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commitment {
    Hash(Hash),
    SingleHash(Hash),
    Point(PublicPoint),
}

impl Commitment {
    pub fn scheme(&self) -> Scheme {
        match self {
            Commitment::Hash(_) => Scheme::HashLock,
            Commitment::SingleHash(_) => Scheme::SingleHashLock,
            Commitment::Point(_) => Scheme::PointLock,
        }
    }

    /// True iff `secret` opens this commitment
    ///
    /// Mismatched schemes, non-canonical scalars and undecodable points all
    /// verify as `false`.
    pub fn verify(&self, secret: &Secret) -> bool {
        match (self, secret) {
            (Commitment::Hash(hash) | Commitment::SingleHash(hash), Secret::Preimage(preimage)) => {
                HashLock::verify(hash, preimage)
            }
            (Commitment::Point(point), Secret::Scalar(scalar)) => {
                match (point.decompress(), scalar.to_scalar()) {
                    (Some(point), Some(scalar)) => PointLock::verify(&point, &scalar),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Verify a hex-encoded secret supplied by a counterparty
    pub fn verify_hex(&self, secret_hex: &str) -> bool {
        Secret::from_hex(self.scheme(), secret_hex)
            .map(|secret| self.verify(&secret))
            .unwrap_or(false)
    }

    /// Identifier used to index this commitment
    pub fn payment_id(&self) -> PaymentId {
        match self {
            Commitment::Hash(hash) | Commitment::SingleHash(hash) => *hash,
            Commitment::Point(point) => point.payment_id(),
        }
    }

    pub fn to_hex(&self) -> String {
        match self {
            Commitment::Hash(hash) | Commitment::SingleHash(hash) => hash.to_hex(),
            Commitment::Point(point) => point.to_hex(),
        }
    }

    pub fn from_hex(scheme: Scheme, hex_str: &str) -> std::result::Result<Self, hex::FromHexError> {
        match scheme {
            Scheme::HashLock => Hash::from_hex(hex_str).map(Commitment::Hash),
            Scheme::SingleHashLock => Hash::from_hex(hex_str).map(Commitment::SingleHash),
            Scheme::PointLock => PublicPoint::from_hex(hex_str).map(Commitment::Point),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_commit_then_verify_all_schemes() {
        let mut rng = StdRng::seed_from_u64(11);
        for scheme in [Scheme::HashLock, Scheme::SingleHashLock, Scheme::PointLock] {
            let secret = scheme.generate(&mut rng);
            let commitment = scheme.commit(&secret).unwrap();
            assert_eq!(commitment.scheme(), scheme);
            assert!(commitment.verify(&secret));
            assert!(!commitment.verify(&scheme.generate(&mut rng)));
        }
    }

    #[test]
    fn test_cross_scheme_never_verifies() {
        let mut rng = StdRng::seed_from_u64(12);
        let preimage = Scheme::HashLock.generate(&mut rng);
        let scalar = Scheme::PointLock.generate(&mut rng);
        assert!(!scalar.commit().unwrap().verify(&preimage));
        assert!(!preimage.commit().unwrap().verify(&scalar));
    }

    #[test]
    fn test_malformed_scalar_fails_verification() {
        let mut rng = StdRng::seed_from_u64(13);
        let commitment = Scheme::PointLock.generate(&mut rng).commit().unwrap();

        // 2^256 - 1 is far above the group order
        let malformed = Secret::Scalar(ScalarSecret([0xff; 32]));
        assert!(malformed.commit().is_none());
        assert!(!commitment.verify(&malformed));
    }

    #[test]
    fn test_malformed_point_fails_verification() {
        let mut rng = StdRng::seed_from_u64(14);
        let secret = Scheme::PointLock.generate(&mut rng);
        let bogus = Commitment::Point(PublicPoint([0xff; 32]));
        assert!(!bogus.verify(&secret));
    }

    #[test]
    fn test_verify_hex_rejects_garbage() {
        let mut rng = StdRng::seed_from_u64(15);
        let secret = Scheme::HashLock.generate(&mut rng);
        let commitment = secret.commit().unwrap();

        assert!(commitment.verify_hex(&secret.to_hex()));
        assert!(!commitment.verify_hex("not hex"));
        assert!(!commitment.verify_hex("abcd"));
    }

    #[test]
    fn test_combine_is_point_lock_only() {
        let mut rng = StdRng::seed_from_u64(16);
        let a = Scheme::HashLock.generate(&mut rng);
        let b = Scheme::HashLock.generate(&mut rng);
        assert!(matches!(
            a.combine(&b),
            Err(SpearError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_offset_matches_combined_secret() {
        let mut rng = StdRng::seed_from_u64(17);
        let root = Scheme::PointLock.generate(&mut rng);
        let part = Scheme::PointLock.generate(&mut rng);

        let (Secret::Scalar(root_scalar), Secret::Scalar(part_scalar)) = (&root, &part) else {
            panic!("expected scalars");
        };
        let offset = PublicPoint::of(root_scalar)
            .unwrap()
            .offset_by(part_scalar)
            .unwrap();

        let combined = root.combine(&part).unwrap();
        assert!(Commitment::Point(offset).verify(&combined));
        assert_eq!(combined.separate(&part).unwrap(), root);
    }

    #[test]
    fn test_single_hash_commitment_is_its_own_arm() {
        let mut rng = StdRng::seed_from_u64(19);
        let secret = Scheme::SingleHashLock.generate(&mut rng);

        let single = Scheme::SingleHashLock.commit(&secret).unwrap();
        let two_stage = Scheme::HashLock.commit(&secret).unwrap();
        assert_ne!(single, two_stage);
        assert_eq!(single.payment_id(), two_stage.payment_id());

        let parsed = Commitment::from_hex(Scheme::SingleHashLock, &single.to_hex()).unwrap();
        assert_eq!(parsed, single);
        assert!(Scheme::PointLock.commit(&secret).is_none());
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("hash".parse::<Scheme>().unwrap(), Scheme::HashLock);
        assert_eq!("simple".parse::<Scheme>().unwrap(), Scheme::SingleHashLock);
        assert_eq!("PTLC".parse::<Scheme>().unwrap(), Scheme::PointLock);
        assert!("rsa".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_secret_serialization() {
        let mut rng = StdRng::seed_from_u64(18);
        let secret = Scheme::PointLock.generate(&mut rng);
        let serialized = serde_json::to_string(&secret).unwrap();
        let deserialized: Secret = serde_json::from_str(&serialized).unwrap();
        assert_eq!(secret, deserialized);
    }
}
