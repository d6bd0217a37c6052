//! Linearly unlocking reward grants.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Rounding};
use crate::error::DexError;
use crate::math::{mul_div, CheckedArithmetic};

/// One reward grant unlocking linearly from `start_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestEntry {
    /// Granted amount.
    pub principal: Amount,
    /// Already withdrawn.
    pub withdrawn: Amount,
    /// Block the grant was created.
    pub start_block: u64,
}

impl VestEntry {
    /// Part of the grant unlocked at `block`: `principal · min(t, W) / W`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::DivisionByZero`] if `window` is zero.
    pub fn unlocked(&self, block: u64, window: u64) -> Result<Amount, DexError> {
        let elapsed = block.saturating_sub(self.start_block).min(window);
        mul_div(
            self.principal,
            Amount::new(u128::from(elapsed)),
            Amount::new(u128::from(window)),
            Rounding::Down,
        )
    }

    /// Unlocked and not yet withdrawn at `block`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::DivisionByZero`] if `window` is zero.
    pub fn withdrawable(&self, block: u64, window: u64) -> Result<Amount, DexError> {
        Ok(self.unlocked(block, window)?.saturating_sub(&self.withdrawn))
    }

    fn is_spent(&self) -> bool {
        self.withdrawn >= self.principal
    }
}

/// Oldest-first queue of a user's vest grants.
///
/// Fully withdrawn entries are dropped from the front on every mutation,
/// so the queue only holds grants with something left.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VestQueue {
    entries: VecDeque<VestEntry>,
}

impl VestQueue {
    /// Live grants, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &VestEntry> {
        self.entries.iter()
    }

    /// Number of live grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is vesting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a grant starting at `block`; zero grants are ignored.
    pub fn push(&mut self, amount: Amount, block: u64) {
        if amount.is_zero() {
            return;
        }
        self.entries.push_back(VestEntry {
            principal: amount,
            withdrawn: Amount::ZERO,
            start_block: block,
        });
    }

    /// Sum withdrawable across all grants at `block`.
    ///
    /// # Errors
    ///
    /// - [`DexError::DivisionByZero`] if `window` is zero.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn withdrawable(&self, block: u64, window: u64) -> Result<Amount, DexError> {
        self.entries.iter().try_fold(Amount::ZERO, |sum, entry| {
            sum.safe_add(&entry.withdrawable(block, window)?)
        })
    }

    /// Granted but not yet withdrawn, locked or not.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn outstanding(&self) -> Result<Amount, DexError> {
        self.entries.iter().try_fold(Amount::ZERO, |sum, entry| {
            sum.safe_add(&entry.principal.saturating_sub(&entry.withdrawn))
        })
    }

    /// Withdraws `amount`, consuming unlocked parts oldest-first.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ExceedsWithdrawableAmount`] if `amount` exceeds
    /// what is unlocked, leaving the queue untouched.
    pub fn withdraw(&mut self, amount: Amount, block: u64, window: u64) -> Result<(), DexError> {
        let withdrawable = self.withdrawable(block, window)?;
        if amount > withdrawable {
            return Err(DexError::ExceedsWithdrawableAmount {
                requested: amount,
                withdrawable,
            });
        }
        let mut rest = amount;
        for entry in &mut self.entries {
            if rest.is_zero() {
                break;
            }
            let take = entry.withdrawable(block, window)?.min(rest);
            entry.withdrawn = entry.withdrawn.safe_add(&take)?;
            rest = rest.safe_sub(&take)?;
        }
        self.compact();
        Ok(())
    }

    /// Drops every grant, returning what was still outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn clear(&mut self) -> Result<Amount, DexError> {
        let outstanding = self.outstanding()?;
        self.entries.clear();
        Ok(outstanding)
    }

    fn compact(&mut self) {
        self.entries.retain(|entry| !entry.is_spent());
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const WINDOW: u64 = 1_000;

    #[test]
    fn unlocks_linearly_then_fully() {
        let mut q = VestQueue::default();
        q.push(Amount::new(999), 100);
        assert_eq!(q.withdrawable(100, WINDOW), Ok(Amount::ZERO));
        assert_eq!(q.withdrawable(101, WINDOW), Ok(Amount::ZERO));
        assert_eq!(q.withdrawable(600, WINDOW), Ok(Amount::new(499)));
        assert_eq!(q.withdrawable(1_100, WINDOW), Ok(Amount::new(999)));
        assert_eq!(q.withdrawable(50_000, WINDOW), Ok(Amount::new(999)));
    }

    #[test]
    fn withdraw_consumes_oldest_first_and_compacts() {
        let mut q = VestQueue::default();
        q.push(Amount::new(1_000), 0);
        q.push(Amount::new(1_000), 500);
        let Ok(()) = q.withdraw(Amount::new(1_200), 1_000, WINDOW) else {
            panic!("withdraw");
        };
        assert_eq!(q.len(), 1);
        let Some(entry) = q.entries().next() else {
            panic!("entry");
        };
        assert_eq!(entry.withdrawn, Amount::new(200));
        assert_eq!(q.outstanding(), Ok(Amount::new(800)));
    }

    #[test]
    fn over_withdraw_rejected_without_change() {
        let mut q = VestQueue::default();
        q.push(Amount::new(1_000), 0);
        let before = q.clone();
        assert_eq!(
            q.withdraw(Amount::new(501), 500, WINDOW),
            Err(DexError::ExceedsWithdrawableAmount {
                requested: Amount::new(501),
                withdrawable: Amount::new(500),
            })
        );
        assert_eq!(q, before);
    }

    #[test]
    fn zero_grants_ignored() {
        let mut q = VestQueue::default();
        q.push(Amount::ZERO, 0);
        assert!(q.is_empty());
    }
}
