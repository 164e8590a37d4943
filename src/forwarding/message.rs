//! Frames exchanged between payer and payee

use crate::crypto::Secret;
use crate::error::Result;
use crate::payment::LockedPart;
use serde::{Deserialize, Serialize};

/// Message envelope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForwardMessage {
    /// One locked part travelling payer → payee
    Part(LockedPart),
    /// Payee asks the payer to reveal secrets for these parts
    RevealRequest(Vec<LockedPart>),
    /// Payer's answer, in request order
    Secrets(Vec<Secret>),
}

impl ForwardMessage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(frame: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(frame)?)
    }
}
