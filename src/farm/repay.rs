//! Compensation pool paying the fee token to receipt-asset stakers.

use std::collections::BTreeMap;

use tracing::info;

use super::accrual::{emission, SubPool};
use crate::config::RepayConfig;
use crate::domain::{Address, Amount};
use crate::error::DexError;
use crate::math::CheckedArithmetic;
use crate::traits::FromConfig;

/// A staker's receipt balance and reward debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepayPosition {
    /// Receipt asset staked.
    pub amount: Amount,
    /// Accrued reward already accounted for.
    pub reward_debt: Amount,
}

/// Single-pool reward accountant for repay receipts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepayAccountant {
    config: RepayConfig,
    pool: SubPool,
    last_reward_block: u64,
    users: BTreeMap<Address, RepayPosition>,
    paid: Amount,
}

impl FromConfig<RepayConfig> for RepayAccountant {
    fn from_config(config: &RepayConfig) -> Result<Self, DexError> {
        config.validate()?;
        Ok(Self {
            config: *config,
            pool: SubPool::default(),
            last_reward_block: config.start_block,
            users: BTreeMap::new(),
            paid: Amount::ZERO,
        })
    }
}

impl RepayAccountant {
    /// Asset stakers deposit.
    #[must_use]
    pub const fn receipt_asset(&self) -> Address {
        self.config.receipt_asset
    }

    /// Total receipt staked.
    #[must_use]
    pub const fn total_staked(&self) -> Amount {
        self.pool.bulk()
    }

    /// Reward harvested so far.
    #[must_use]
    pub const fn total_paid(&self) -> Amount {
        self.paid
    }

    /// `user`'s position.
    #[must_use]
    pub fn position(&self, user: &Address) -> RepayPosition {
        self.users.get(user).copied().unwrap_or_default()
    }

    fn due(&self, block: u64) -> Result<Amount, DexError> {
        if block <= self.last_reward_block || self.pool.bulk().is_zero() {
            return Ok(Amount::ZERO);
        }
        emission(block - self.last_reward_block, self.config.reward_per_block, 1, 1)
    }

    /// Releases reward for the blocks since the last update.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn update(&mut self, block: u64) -> Result<Amount, DexError> {
        if block <= self.last_reward_block {
            return Ok(Amount::ZERO);
        }
        let due = self.due(block)?;
        let released = if self.pool.distribute(due) { due } else { Amount::ZERO };
        self.last_reward_block = block;
        Ok(released)
    }

    /// Reward `user` could harvest at `block`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn pending(&self, user: &Address, block: u64) -> Result<Amount, DexError> {
        let position = self.position(user);
        let mut pool = self.pool;
        pool.distribute(self.due(block)?);
        pool.pending(position.amount, position.reward_debt)
    }

    fn settle(&mut self, user: &Address, block: u64, delta: impl FnOnce(Amount) -> Result<Amount, DexError>) -> Result<Amount, DexError> {
        self.update(block)?;
        let mut position = self.position(user);
        let harvested = self.pool.pending(position.amount, position.reward_debt)?;
        let amount = delta(position.amount)?;
        if amount > position.amount {
            self.pool.add_bulk(amount.safe_sub(&position.amount)?)?;
        } else {
            self.pool.remove_bulk(position.amount.safe_sub(&amount)?)?;
        }
        position.amount = amount;
        position.reward_debt = self.pool.accrued(amount)?;
        self.users.insert(*user, position);
        self.paid = self.paid.safe_add(&harvested)?;
        Ok(harvested)
    }

    /// Stakes `amount` of receipt; returns the reward harvested on the way.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn deposit(&mut self, user: &Address, amount: Amount, block: u64) -> Result<Amount, DexError> {
        let harvested = self.settle(user, block, |held| held.safe_add(&amount))?;
        info!(%user, %amount, %harvested, "repay deposit");
        Ok(harvested)
    }

    /// Unstakes `amount` of receipt; returns the reward harvested on the way.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientBalance`] above the staked amount.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn withdraw(&mut self, user: &Address, amount: Amount, block: u64) -> Result<Amount, DexError> {
        let harvested = self.settle(user, block, |held| {
            held.checked_sub(&amount).ok_or(DexError::InsufficientBalance {
                available: held,
                requested: amount,
            })
        })?;
        info!(%user, %amount, %harvested, "repay withdraw");
        Ok(harvested)
    }

    /// Harvests pending reward without changing the stake.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn harvest(&mut self, user: &Address, block: u64) -> Result<Amount, DexError> {
        self.settle(user, block, Ok)
    }
}
