//! Available/locked balance pair

use crate::error::{Result, SpearError};
use serde::{Deserialize, Serialize};

/// Funds held by a node
///
/// `lock` and `unlock` move value between the two buckets; their sum only
/// changes through [`Balance::deposit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub available: u64,
    pub locked: u64,
}

impl Balance {
    pub fn total(&self) -> u64 {
        self.available + self.locked
    }

    pub fn deposit(&mut self, amount: u64) -> Result<()> {
        let available = self
            .available
            .checked_add(amount)
            .filter(|available| available.checked_add(self.locked).is_some())
            .ok_or_else(|| SpearError::InvalidInput(format!("deposit of {} overflows", amount)))?;
        self.available = available;
        Ok(())
    }

    pub fn lock(&mut self, amount: u64) -> Result<()> {
        if self.available < amount {
            return Err(SpearError::InsufficientBalance {
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        self.locked += amount;
        Ok(())
    }

    pub fn unlock(&mut self, amount: u64) -> Result<()> {
        if self.locked < amount {
            return Err(SpearError::InsufficientLockedBalance {
                required: amount,
                locked: self.locked,
            });
        }
        self.locked -= amount;
        self.available += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_lock_and_unlock() {
        let mut balance = Balance::default();
        balance.deposit(1000).unwrap();

        balance.lock(140).unwrap();
        assert_eq!(balance, Balance { available: 860, locked: 140 });

        balance.unlock(40).unwrap();
        assert_eq!(balance, Balance { available: 900, locked: 100 });
    }

    #[test]
    fn test_lock_beyond_available_leaves_state() {
        let mut balance = Balance { available: 100, locked: 0 };
        assert!(matches!(
            balance.lock(101),
            Err(SpearError::InsufficientBalance { required: 101, available: 100 })
        ));
        assert_eq!(balance, Balance { available: 100, locked: 0 });
    }

    #[test]
    fn test_unlock_beyond_locked_leaves_state() {
        let mut balance = Balance { available: 10, locked: 5 };
        assert!(matches!(
            balance.unlock(6),
            Err(SpearError::InsufficientLockedBalance { required: 6, locked: 5 })
        ));
        assert_eq!(balance, Balance { available: 10, locked: 5 });
    }

    #[test]
    fn test_conservation_over_random_sequences() {
        let mut rng = StdRng::seed_from_u64(41);
        let mut balance = Balance::default();
        balance.deposit(10_000).unwrap();

        for _ in 0..1_000 {
            let amount = rng.gen_range(0..3_000);
            let _ = if rng.gen_bool(0.5) {
                balance.lock(amount)
            } else {
                balance.unlock(amount)
            };
            assert_eq!(balance.total(), 10_000);
        }
    }

    #[test]
    fn test_deposit_overflow_rejected() {
        let mut balance = Balance { available: u64::MAX - 1, locked: 1 };
        assert!(balance.deposit(1).is_err());
        assert_eq!(balance.available, u64::MAX - 1);
    }
}
