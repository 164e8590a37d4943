//! Lock commitments, secrets and payment proofs

pub mod commitment;
pub mod proof;
pub mod types;

pub use commitment::{CommitmentScheme, HashLock, Homomorphic, PointLock};
pub use proof::PaymentProof;
pub use types::{Commitment, PublicPoint, ScalarSecret, Scheme, Secret};
