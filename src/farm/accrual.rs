//! Share-weighted reward accrual shared by the farm and the repay pool.
//!
//! A [`SubPool`] tracks its staked `bulk` and a reward-per-share
//! accumulator scaled by [`ACC_PRECISION`].  A staker's accrued reward is
//! `amount · acc / ACC_PRECISION`; the part already accounted for is kept
//! as the staker's reward debt.

use ethnum::U256;
use tracing::debug;

use crate::domain::Amount;
use crate::error::DexError;
use crate::math::{narrow, widen, CheckedArithmetic};

/// Fixed-point scale of every reward-per-share accumulator.
pub const ACC_PRECISION: u128 = 1_000_000_000_000;

/// Staked bulk plus its reward-per-share accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubPool {
    bulk: Amount,
    acc_per_share: U256,
}

impl SubPool {
    /// Total staked.
    #[must_use]
    pub const fn bulk(&self) -> Amount {
        self.bulk
    }

    /// Reward per staked unit, scaled by [`ACC_PRECISION`].
    #[must_use]
    pub const fn acc_per_share(&self) -> U256 {
        self.acc_per_share
    }

    /// Adds stake.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn add_bulk(&mut self, amount: Amount) -> Result<(), DexError> {
        self.bulk = self.bulk.safe_add(&amount)?;
        Ok(())
    }

    /// Removes stake.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if more is removed than staked.
    pub fn remove_bulk(&mut self, amount: Amount) -> Result<(), DexError> {
        self.bulk = self.bulk.safe_sub(&amount)?;
        Ok(())
    }

    /// Spreads `reward` over the current bulk.
    ///
    /// Returns `false`, accruing nothing, when the bulk is zero.
    pub fn distribute(&mut self, reward: Amount) -> bool {
        if self.bulk.is_zero() || reward.is_zero() {
            return false;
        }
        let step = widen(reward) * U256::from(ACC_PRECISION) / widen(self.bulk);
        self.acc_per_share = self.acc_per_share.wrapping_add(step);
        debug!(%reward, bulk = %self.bulk, "reward distributed");
        true
    }

    /// Reward accrued by `amount` of stake since the accumulator began.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if the product overflows.
    pub fn accrued(&self, amount: Amount) -> Result<Amount, DexError> {
        let scaled = widen(amount)
            .checked_mul(self.acc_per_share)
            .ok_or(DexError::ArithmeticOverflow("accrued reward"))?;
        narrow(scaled / U256::from(ACC_PRECISION), "accrued reward")
    }

    /// Reward accrued by `amount` beyond `debt`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if the product overflows.
    pub fn pending(&self, amount: Amount, debt: Amount) -> Result<Amount, DexError> {
        Ok(self.accrued(amount)?.saturating_sub(&debt))
    }
}

/// Reward emitted over `blocks` for a pool holding `alloc` of `total_alloc`.
///
/// # Errors
///
/// Returns [`DexError::ArithmeticOverflow`] if the result exceeds 128 bits.
pub fn emission(
    blocks: u64,
    per_block: Amount,
    alloc: u64,
    total_alloc: u64,
) -> Result<Amount, DexError> {
    if total_alloc == 0 || alloc == 0 || blocks == 0 {
        return Ok(Amount::ZERO);
    }
    let product = U256::from(blocks) * widen(per_block) * U256::from(alloc);
    narrow(product / U256::from(total_alloc), "emission")
}
