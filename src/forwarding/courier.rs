//! Simulated forwarding of locked parts from payer to payee

use crate::error::{Result, SpearError};
use crate::payment::{LockedPart, Node};
use crate::types::PaymentId;
use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::message::ForwardMessage;

/// Pick `count` distinct parts at random, modelling lossy forwarding
pub fn sample_parts<R: Rng + ?Sized>(parts: &[LockedPart], count: usize, rng: &mut R) -> Vec<LockedPart> {
    parts
        .choose_multiple(rng, count.min(parts.len()))
        .cloned()
        .collect()
}

/// Delivers parts to a payee node one frame at a time
pub struct Courier {
    payee: Arc<Node>,
    delay: Duration,
}

impl Courier {
    pub fn new(payee: Arc<Node>) -> Self {
        Self {
            payee,
            delay: Duration::ZERO,
        }
    }

    /// Pause between frames
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Forward `parts` in order, polling the payee after each one
    ///
    /// Stops at the first sufficient set and returns it. `None` means the
    /// parts ran out first.
    pub async fn deliver(
        &self,
        payment_id: PaymentId,
        parts: Vec<LockedPart>,
    ) -> Result<Option<Vec<LockedPart>>> {
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(parts.len().max(1));
        let delay = self.delay;

        let sender = tokio::spawn(async move {
            for part in parts {
                let frame = ForwardMessage::Part(part).encode()?;
                if tx.send(frame).await.is_err() {
                    // payee already has enough
                    break;
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Ok::<(), SpearError>(())
        });

        let mut ready = None;
        while let Some(frame) = rx.recv().await {
            match ForwardMessage::decode(&frame)? {
                ForwardMessage::Part(part) => {
                    self.payee.receive_parts(std::slice::from_ref(&part));
                    tracing::debug!("Forwarded part {} to payee", part.lock_id().short());
                }
                other => {
                    tracing::warn!("Courier dropped unexpected frame: {:?}", other);
                    continue;
                }
            }

            if let Some(parts) = self.payee.get_received_parts(&payment_id)? {
                tracing::info!("Payee received enough parts: {}", parts.len());
                ready = Some(parts);
                break;
            }
            tracing::debug!("Waiting for next part");
        }
        drop(rx);

        sender
            .await
            .map_err(|e| SpearError::Channel(e.to_string()))??;
        Ok(ready)
    }

    /// Push the same parts from `fanout` tasks at once
    ///
    /// Returns how many parts the payee actually stored.
    pub async fn deliver_concurrently(&self, parts: Vec<LockedPart>, fanout: usize) -> Result<usize> {
        let parts = Arc::new(parts);
        let tasks = (0..fanout).map(|_| {
            let payee = Arc::clone(&self.payee);
            let parts = Arc::clone(&parts);
            tokio::spawn(async move { payee.receive_parts(&parts) })
        });

        let mut stored = 0;
        for outcome in join_all(tasks).await {
            stored += outcome.map_err(|e| SpearError::Channel(e.to_string()))?;
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Scheme;
    use crate::payment::InvoiceTicket;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn setup() -> (Node, Arc<Node>, InvoiceTicket, Vec<LockedPart>) {
        let payer = Node::with_rng(StdRng::seed_from_u64(71));
        let payee = Arc::new(Node::with_rng(StdRng::seed_from_u64(72)));
        payer.deposit(1000).unwrap();
        let ticket = payee.new_invoice(100, Scheme::HashLock).unwrap();
        let parts = payer.pay(&ticket.key, 100, 5, 2).unwrap();
        (payer, payee, ticket, parts)
    }

    #[test]
    fn test_sample_parts_distinct() {
        let (_, _, _, parts) = setup();
        let mut rng = StdRng::seed_from_u64(73);

        let sample = sample_parts(&parts, 5, &mut rng);
        assert_eq!(sample.len(), 5);
        let distinct: HashSet<_> = sample.iter().collect();
        assert_eq!(distinct.len(), 5);

        assert_eq!(sample_parts(&parts, 20, &mut rng).len(), 7);
    }

    #[tokio::test]
    async fn test_deliver_stops_at_sufficient_set() {
        let (_, payee, ticket, parts) = setup();
        let courier = Courier::new(Arc::clone(&payee));

        let ready = courier
            .deliver(ticket.payment_id, parts.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ready, parts[..5].to_vec());
        assert!(payee.received_count() >= 5);
    }

    #[tokio::test]
    async fn test_deliver_short_sample_is_none() {
        let (_, payee, ticket, parts) = setup();
        let courier = Courier::new(payee).with_delay(Duration::from_millis(1));

        let ready = courier
            .deliver(ticket.payment_id, parts[..4].to_vec())
            .await
            .unwrap();
        assert!(ready.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_delivery_stores_each_part_once() {
        let (_, payee, ticket, parts) = setup();
        let courier = Courier::new(Arc::clone(&payee));

        let stored = courier.deliver_concurrently(parts, 6).await.unwrap();
        assert_eq!(stored, 7);
        assert_eq!(payee.received_count(), 7);
        assert_eq!(
            payee
                .get_received_parts(&ticket.payment_id)
                .unwrap()
                .map(|p| p.len()),
            Some(5)
        );
    }

    #[test]
    fn test_deliver_unknown_invoice_errors() {
        let (_, payee, _, parts) = setup();
        let courier = Courier::new(payee);
        let unknown = crate::types::Hash::from_bytes(b"nobody");

        let result = tokio_test::block_on(courier.deliver(unknown, parts));
        assert!(matches!(result, Err(SpearError::InvoiceNotFound(_))));
    }
}
