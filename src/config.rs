//! Protocol configuration

use crate::crypto::Scheme;
use crate::error::{Result, SpearError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters for a payment run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Lock scheme for new invoices
    pub scheme: Scheme,
    /// Parts needed to cover the invoice
    pub parts_count: usize,
    /// Extra parts sent for delivery tolerance
    pub redundant_parts_count: usize,
    /// Payer's starting balance
    pub initial_balance: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::HashLock,
            parts_count: 5,
            redundant_parts_count: 2,
            initial_balance: 1000,
        }
    }
}

impl ProtocolConfig {
    /// Load from a JSON file; absent fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.parts_count == 0 {
            return Err(SpearError::InvalidConfig(
                "parts_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parts created per payment
    pub fn total_parts(&self) -> usize {
        self.parts_count + self.redundant_parts_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProtocolConfig::default();
        assert_eq!(config.scheme, Scheme::HashLock);
        assert_eq!(config.total_parts(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ProtocolConfig =
            serde_json::from_str(r#"{"scheme": "point_lock", "parts_count": 4}"#).unwrap();
        assert_eq!(config.scheme, Scheme::PointLock);
        assert_eq!(config.parts_count, 4);
        assert_eq!(config.redundant_parts_count, 2);
        assert_eq!(config.initial_balance, 1000);
    }

    #[test]
    fn test_zero_parts_rejected() {
        let config = ProtocolConfig {
            parts_count: 0,
            ..ProtocolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SpearError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("spear-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"initial_balance": 500}"#).unwrap();

        let config = ProtocolConfig::from_file(&path).unwrap();
        assert_eq!(config.initial_balance, 500);
        assert_eq!(config.parts_count, 5);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            ProtocolConfig::from_file(&path),
            Err(SpearError::Io(_))
        ));
    }
}
