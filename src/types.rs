//! Core types used throughout Spear

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 hash wrapper
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Create hash from bytes using SHA-256
    pub fn from_bytes(data: &[u8]) -> Self {
        Hash(Sha256::digest(data).into())
    }

    /// Get hash as hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create hash from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        Ok(Hash(decode_32(hex_str)?))
    }

    /// Short prefix for log lines
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Identifier of an invoice, shared by every part paying it
pub type PaymentId = Hash;

/// 32-byte secret preimage for hash locks
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preimage(pub [u8; 32]);

impl Preimage {
    /// Draw a fresh preimage from `rng`
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut secret = [0u8; 32];
        rng.fill_bytes(&mut secret);
        Preimage(secret)
    }

    /// Compute hash of this secret
    pub fn hash(&self) -> Hash {
        Hash::from_bytes(&self.0)
    }

    /// Get secret as hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create secret from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        Ok(Preimage(decode_32(hex_str)?))
    }
}

// Preimages stay out of logs.
impl fmt::Debug for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Preimage(..)")
    }
}

pub(crate) fn decode_32(hex_str: &str) -> Result<[u8; 32], hex::FromHexError> {
    let bytes = hex::decode(hex_str)?;
    bytes
        .try_into()
        .map_err(|_| hex::FromHexError::InvalidStringLength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hash_consistency() {
        let hash1 = Hash::from_bytes(b"test data");
        let hash2 = Hash::from_bytes(b"test data");
        assert_eq!(hash1, hash2);

        let hash3 = Hash::from_bytes(b"different data");
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_hash_matches_sha256_vector() {
        let hash = Hash::from_bytes(b"abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_preimage() {
        let mut rng = StdRng::seed_from_u64(7);
        let secret1 = Preimage::random(&mut rng);
        let secret2 = Preimage::random(&mut rng);
        assert_ne!(secret1, secret2);

        assert_eq!(secret1.hash(), secret1.hash());
        assert_ne!(secret1.hash(), secret2.hash());
    }

    #[test]
    fn test_preimage_debug_hides_bytes() {
        let secret = Preimage([0xab; 32]);
        assert_eq!(format!("{:?}", secret), "Preimage(..)");
    }

    #[test]
    fn test_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Preimage::from_hex("zz").is_err());

        let hash = Hash::from_bytes(b"x");
        assert_eq!(Hash::from_hex(&hash.to_hex()).unwrap(), hash);
    }
}
