//! Per-user position in one farm pool.

use super::branch::CollectOption;
use super::vesting::VestQueue;
use crate::domain::Amount;

/// A user's stake and reward state in one farm pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserInfo {
    /// Principal deposited; weight for accrual.
    pub amount: Amount,
    /// `amount · acc / ACC_PRECISION` at the last settlement.
    pub reward_debt: Amount,
    /// Branch the principal sits in.
    pub option: CollectOption,
    /// Settled reward awaiting harvest, compound, stake or vest.
    pub accumulated: Amount,
    /// Settled reward staged for compounding; weight in `PreComp`.
    pub staged: Amount,
    /// `staged · acc / ACC_PRECISION` of `PreComp` at the last settlement.
    pub staged_debt: Amount,
    /// Vest grants.
    pub vest: VestQueue,
}

impl UserInfo {
    /// Returns `true` if nothing at all is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_zero()
            && self.accumulated.is_zero()
            && self.staged.is_zero()
            && self.vest.is_empty()
    }
}
