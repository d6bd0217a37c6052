//! One farm pool and its branch matrix.

use tracing::debug;

use super::accrual::emission;
use super::branch::{Branch, CollectOption};
use crate::domain::{Address, Amount, Rate, Rounding};
use crate::error::DexError;
use crate::math::{mul_div, CheckedArithmetic};

/// A farm pool accepting one deposit asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmPool {
    asset: Address,
    alloc_point: u64,
    deposit_fee: Rate,
    last_reward_block: u64,
    branches: [Branch; 4],
}

impl FarmPool {
    /// Creates a pool accruing from `start_block`.
    #[must_use]
    pub fn new(asset: Address, alloc_point: u64, deposit_fee: Rate, start_block: u64) -> Self {
        Self {
            asset,
            alloc_point,
            deposit_fee,
            last_reward_block: start_block,
            branches: Branch::matrix(),
        }
    }

    /// Deposit asset.
    #[must_use]
    pub const fn asset(&self) -> Address {
        self.asset
    }

    /// Emission weight.
    #[must_use]
    pub const fn alloc_point(&self) -> u64 {
        self.alloc_point
    }

    /// Fee charged on deposits.
    #[must_use]
    pub const fn deposit_fee(&self) -> Rate {
        self.deposit_fee
    }

    /// Last block rewards were distributed for.
    #[must_use]
    pub const fn last_reward_block(&self) -> u64 {
        self.last_reward_block
    }

    /// Branch for `option`.
    #[must_use]
    pub const fn branch(&self, option: CollectOption) -> &Branch {
        &self.branches[option.index()]
    }

    pub(crate) fn branch_mut(&mut self, option: CollectOption) -> &mut Branch {
        &mut self.branches[option.index()]
    }

    /// Earning bulk across every branch: principal plus staged reward.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn total_bulk(&self) -> Result<Amount, DexError> {
        self.branches
            .iter()
            .try_fold(Amount::ZERO, |sum, b| sum.safe_add(&b.earning_bulk()?))
    }

    pub(crate) fn set_params(&mut self, alloc_point: u64, deposit_fee: Rate) {
        self.alloc_point = alloc_point;
        self.deposit_fee = deposit_fee;
    }

    /// Reward due for the blocks since the last update.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn due(&self, block: u64, per_block: Amount, total_alloc: u64) -> Result<Amount, DexError> {
        if block <= self.last_reward_block || self.total_bulk()?.is_zero() {
            return Ok(Amount::ZERO);
        }
        emission(
            block - self.last_reward_block,
            per_block,
            self.alloc_point,
            total_alloc,
        )
    }

    /// The pool as it would be after distributing `reward` at `block`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn preview(&self, block: u64, reward: Amount) -> Result<Self, DexError> {
        let mut next = self.clone();
        next.distribute(block, reward)?;
        Ok(next)
    }

    /// Distributes `reward` across earning sub-pools by bulk and marks the
    /// pool updated at `block`.  Returns the amount actually distributed.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn distribute(&mut self, block: u64, reward: Amount) -> Result<Amount, DexError> {
        if block <= self.last_reward_block {
            return Ok(Amount::ZERO);
        }
        let total = self.total_bulk()?;
        let mut spread = Amount::ZERO;
        if !total.is_zero() && !reward.is_zero() {
            for sub in self.branches.iter_mut().flat_map(Branch::earning_mut) {
                let share = mul_div(reward, sub.bulk(), total, Rounding::Down)?;
                if sub.distribute(share) {
                    spread = spread.safe_add(&share)?;
                }
            }
        }
        self.last_reward_block = block;
        debug!(asset = %self.asset, block, %spread, "farm pool updated");
        Ok(spread)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::farm::SubPoolKind;

    fn pool() -> FarmPool {
        let mut p = FarmPool::new(Address::from_label("lp"), 100, Rate::ZERO, 10);
        let Ok(()) = p
            .branch_mut(CollectOption::OffOff)
            .principal_mut()
            .add_bulk(Amount::new(300))
        else {
            panic!("bulk");
        };
        let Ok(()) = p
            .branch_mut(CollectOption::OnOn)
            .principal_mut()
            .add_bulk(Amount::new(100))
        else {
            panic!("bulk");
        };
        p
    }

    #[test]
    fn reward_split_by_branch_bulk() {
        let mut p = pool();
        assert_eq!(p.distribute(11, Amount::new(4_000)), Ok(Amount::new(4_000)));
        let off = p.branch(CollectOption::OffOff).principal();
        let on = p.branch(CollectOption::OnOn).principal();
        assert_eq!(off.pending(Amount::new(300), Amount::ZERO), Ok(Amount::new(3_000)));
        assert_eq!(on.pending(Amount::new(100), Amount::ZERO), Ok(Amount::new(1_000)));
        assert_eq!(
            p.branch(CollectOption::OnOff).principal().acc_per_share(),
            ethnum::U256::ZERO
        );
    }

    #[test]
    fn staged_reward_shares_emission() {
        let mut p = pool();
        let Ok(()) = p
            .branch_mut(CollectOption::OnOn)
            .shift_staged(Amount::new(100), Amount::ZERO)
        else {
            panic!("stage");
        };
        assert_eq!(p.total_bulk(), Ok(Amount::new(500)));
        assert_eq!(p.distribute(11, Amount::new(5_000)), Ok(Amount::new(5_000)));
        let Some(staged) = p.branch(CollectOption::OnOn).sub_pool(SubPoolKind::PreComp) else {
            panic!("pre-comp");
        };
        assert_eq!(staged.pending(Amount::new(100), Amount::ZERO), Ok(Amount::new(1_000)));
        let Some(vest) = p.branch(CollectOption::OnOn).sub_pool(SubPoolKind::Vest) else {
            panic!("vest");
        };
        assert_eq!(vest.acc_per_share(), ethnum::U256::ZERO);
    }

    #[test]
    fn second_update_same_block_is_noop() {
        let mut p = pool();
        let Ok(_) = p.distribute(20, Amount::new(1_000)) else {
            panic!("update");
        };
        let snapshot = p.clone();
        assert_eq!(p.distribute(20, Amount::new(1_000)), Ok(Amount::ZERO));
        assert_eq!(p, snapshot);
    }

    #[test]
    fn due_counts_blocks_since_last_update() {
        let p = pool();
        assert_eq!(p.due(10, Amount::new(7), 100), Ok(Amount::ZERO));
        assert_eq!(p.due(15, Amount::new(7), 200), Ok(Amount::new(17)));
    }
}
