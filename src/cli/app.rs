//! Spear application wiring a payer and a payee

use crate::config::ProtocolConfig;
use crate::crypto::{Commitment, PaymentProof, Scheme, Secret};
use crate::error::{Result, SpearError};
use crate::forwarding::{sample_parts, Courier, ForwardMessage};
use crate::payment::{Balance, LockedPart, Node};
use crate::types::PaymentId;
use rand::rngs::OsRng;
use std::sync::Arc;

/// Summary of a completed payment
#[derive(Clone, Debug)]
pub struct PaymentOutcome {
    pub payment_id: PaymentId,
    pub key: Commitment,
    pub parts_created: usize,
    pub parts_claimed: usize,
    pub payer_balance: Balance,
    pub proof: PaymentProof,
}

/// Main Spear application
#[derive(Clone)]
pub struct SpearApp {
    payer: Arc<Node>,
    payee: Arc<Node>,
    config: ProtocolConfig,
}

impl SpearApp {
    /// Create a payer funded per `config` and an empty payee
    pub fn new(config: ProtocolConfig) -> Result<Self> {
        Self::with_nodes(config, Node::new(), Node::new())
    }

    /// Use caller-supplied nodes (e.g. with seeded secret sources)
    pub fn with_nodes(config: ProtocolConfig, payer: Node, payee: Node) -> Result<Self> {
        config.validate()?;
        payer.deposit(config.initial_balance)?;

        Ok(Self {
            payer: Arc::new(payer),
            payee: Arc::new(payee),
            config,
        })
    }

    pub fn payer(&self) -> Arc<Node> {
        self.payer.clone()
    }

    pub fn payee(&self) -> Arc<Node> {
        self.payee.clone()
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Run invoice → pay → forward → reveal → claim → proof
    ///
    /// Returns `None` when the forwarded sample never covered the invoice.
    pub async fn run_payment(&self, amount: u64) -> Result<Option<PaymentOutcome>> {
        let config = &self.config;

        // 1. Payee creates invoice
        let ticket = self.payee.new_invoice(amount, config.scheme)?;

        // 2. Payer locks redundant parts
        let parts = self.payer.pay(
            &ticket.key,
            amount,
            config.parts_count,
            config.redundant_parts_count,
        )?;

        // 3. Lossy forwarding: a random subset reaches the payee
        let selected = sample_parts(&parts, config.parts_count, &mut OsRng);
        let received = match Courier::new(self.payee.clone())
            .deliver(ticket.payment_id, selected)
            .await?
        {
            Some(received) => received,
            None => {
                tracing::warn!("Payee didn't receive enough parts to claim payment");
                return Ok(None);
            }
        };

        // 4. Reveal and claim
        let secrets = self.exchange_reveal(&received)?;
        let receipt = self.payee.claim(&received, &secrets)?;

        // 5. Payment proof
        let proof = match config.scheme {
            Scheme::HashLock | Scheme::SingleHashLock => self.payee.get_proof(&ticket.payment_id)?,
            Scheme::PointLock => self.payer.derive_proof(&received, &receipt)?,
        };
        if !proof.verify(&ticket.key) {
            return Err(SpearError::ProofInconsistency);
        }
        tracing::info!("Payment proof verified for {}", ticket.payment_id.short());

        Ok(Some(PaymentOutcome {
            payment_id: ticket.payment_id,
            key: ticket.key,
            parts_created: parts.len(),
            parts_claimed: receipt.parts,
            payer_balance: self.payer.balance(),
            proof,
        }))
    }

    /// Round-trip a reveal request through wire frames
    fn exchange_reveal(&self, parts: &[LockedPart]) -> Result<Vec<Secret>> {
        let request = ForwardMessage::RevealRequest(parts.to_vec()).encode()?;

        let response = match ForwardMessage::decode(&request)? {
            ForwardMessage::RevealRequest(requested) => {
                ForwardMessage::Secrets(self.payer.reveal(&requested)?).encode()?
            }
            other => {
                return Err(SpearError::InvalidInput(format!(
                    "expected reveal request, got {:?}",
                    other
                )))
            }
        };

        match ForwardMessage::decode(&response)? {
            ForwardMessage::Secrets(secrets) => Ok(secrets),
            other => Err(SpearError::InvalidInput(format!(
                "expected secrets, got {:?}",
                other
            ))),
        }
    }
}

/// Check a hex payment proof against a hex invoice key
///
/// Needs no node state: this is what a third party runs.
pub fn verify_proof(scheme: Scheme, key_hex: &str, proof_hex: &str) -> Result<bool> {
    let key = Commitment::from_hex(scheme, key_hex)?;
    let proof = PaymentProof(Secret::from_hex(scheme, proof_hex)?);
    Ok(proof.verify(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn app(scheme: Scheme) -> SpearApp {
        let config = ProtocolConfig {
            scheme,
            ..ProtocolConfig::default()
        };
        SpearApp::with_nodes(
            config,
            Node::with_rng(StdRng::seed_from_u64(81)),
            Node::with_rng(StdRng::seed_from_u64(82)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_hash_lock_run() {
        let app = app(Scheme::HashLock);
        let outcome = app.run_payment(100).await.unwrap().unwrap();

        assert_eq!(outcome.parts_created, 7);
        assert_eq!(outcome.parts_claimed, 5);
        assert_eq!(outcome.payer_balance, Balance { available: 860, locked: 140 });
        assert!(outcome.proof.verify(&outcome.key));
        assert!(app.payee().is_claimed(&outcome.payment_id));
    }

    #[tokio::test]
    async fn test_single_hash_lock_run() {
        let app = app(Scheme::SingleHashLock);
        assert_eq!(app.config().scheme, Scheme::SingleHashLock);

        let outcome = app.run_payment(100).await.unwrap().unwrap();
        assert_eq!(outcome.parts_claimed, 5);
        assert!(verify_proof(
            Scheme::SingleHashLock,
            &outcome.key.to_hex(),
            &outcome.proof.to_hex()
        )
        .unwrap());
    }

    #[tokio::test]
    async fn test_point_lock_run_and_independent_verify() {
        let app = app(Scheme::PointLock);
        let outcome = app.run_payment(100).await.unwrap().unwrap();

        let ok = verify_proof(
            Scheme::PointLock,
            &outcome.key.to_hex(),
            &outcome.proof.to_hex(),
        )
        .unwrap();
        assert!(ok);

        let wrong = Scheme::PointLock.generate(&mut StdRng::seed_from_u64(83));
        assert!(!verify_proof(Scheme::PointLock, &outcome.key.to_hex(), &wrong.to_hex()).unwrap());
    }

    #[tokio::test]
    async fn test_run_rejects_uneven_split() {
        let app = app(Scheme::HashLock);
        assert!(matches!(
            app.run_payment(101).await,
            Err(SpearError::InvalidInput(_))
        ));
        assert_eq!(app.payer().balance(), Balance { available: 1000, locked: 0 });
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProtocolConfig {
            parts_count: 0,
            ..ProtocolConfig::default()
        };
        assert!(matches!(
            SpearApp::new(config),
            Err(SpearError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_verify_proof_bad_hex() {
        assert!(matches!(
            verify_proof(Scheme::HashLock, "xyz", "00"),
            Err(SpearError::HexDecode(_))
        ));
    }
}
