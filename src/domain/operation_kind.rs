//! Classification of fee-token movements.

use core::fmt;

use serde::{Deserialize, Serialize};

/// What a fee-token movement is for; selects the row of the fee table.
///
/// Callers outside the router and farm can only ever produce
/// [`OperationKind::Transfer`] (or [`OperationKind::None`] for flagged
/// accounts); every other kind is asserted by a trusted component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Penalty row applied to flagged accounts.
    None,
    /// Plain user-to-user transfer.
    Transfer,
    /// Swap through a pool.
    Swap,
    /// Supplying liquidity to a pool.
    AddLiquidity,
    /// Redeeming liquidity from a pool.
    RemoveLiquidity,
    /// Farm deposit.
    Deposit,
    /// Farm withdrawal.
    Withdraw,
    /// Compounding accumulated reward into principal.
    CompoundAccumulated,
    /// Vesting accumulated reward.
    VestAccumulated,
    /// Paying out accumulated reward.
    HarvestAccumulated,
    /// Staking accumulated reward into the staking pool.
    StakeAccumulated,
    /// Harvest across every pool.
    MassHarvest,
    /// Stake across every pool.
    MassStake,
    /// Compound across every pool.
    MassCompound,
    /// Withdrawing unlocked vest.
    WithdrawVest,
    /// Reward emission during pool update.
    UpdatePool,
    /// Emergency principal withdrawal.
    EmergencyWithdraw,
    /// Changing collect option.
    SwitchCollectOption,
    /// Compensation harvest.
    HarvestRepay,
}

impl OperationKind {
    /// Number of kinds.
    pub const COUNT: usize = 19;

    /// Every kind in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::None,
        Self::Transfer,
        Self::Swap,
        Self::AddLiquidity,
        Self::RemoveLiquidity,
        Self::Deposit,
        Self::Withdraw,
        Self::CompoundAccumulated,
        Self::VestAccumulated,
        Self::HarvestAccumulated,
        Self::StakeAccumulated,
        Self::MassHarvest,
        Self::MassStake,
        Self::MassCompound,
        Self::WithdrawVest,
        Self::UpdatePool,
        Self::EmergencyWithdraw,
        Self::SwitchCollectOption,
        Self::HarvestRepay,
    ];

    /// Row index of this kind in the fee table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for kinds only the router may assert.
    #[must_use]
    pub const fn is_pool_kind(self) -> bool {
        matches!(self, Self::Swap | Self::AddLiquidity | Self::RemoveLiquidity)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_table_order() {
        for (i, kind) in OperationKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(OperationKind::HarvestRepay.index(), OperationKind::COUNT - 1);
    }

    #[test]
    fn pool_kinds() {
        assert!(OperationKind::Swap.is_pool_kind());
        assert!(!OperationKind::Deposit.is_pool_kind());
    }
}
