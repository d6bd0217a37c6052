//! Farm and repay accountant configuration.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, Rate};
use crate::error::DexError;

/// Blocks per 30-day month at a three-second block time.
pub const BLOCKS_PER_MONTH: u64 = 864_000;

/// Reward emission and payout policy of the farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Reward tokens emitted per block across all farm pools.
    pub reward_per_block: Amount,
    /// First block that accrues rewards.
    pub start_block: u64,
    /// Linear unlock window of every vest entry, in blocks.
    pub vest_window_blocks: u64,
    /// Share of every non-vested payout that is burned.
    pub non_vest_burn_rate: Rate,
    /// Share of compounded reward routed to the treasury.
    pub compound_fee_rate: Rate,
    /// Share of every payout credited to the user's referrer.
    pub referral_commission_rate: Rate,
    /// Total reward the farm may ever emit; `None` is unbounded.
    pub emission_budget: Option<Amount>,
    /// Largest relative change allowed per reward-rate update; `None` is unbounded.
    pub max_reward_rate_change: Option<Rate>,
}

impl FarmConfig {
    /// Validates all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] on the first violation.
    pub fn validate(&self) -> Result<(), DexError> {
        if self.vest_window_blocks == 0 {
            return Err(DexError::InvalidConfiguration("vest window is zero"));
        }
        self.non_vest_burn_rate.validate()?;
        self.compound_fee_rate.validate()?;
        self.referral_commission_rate.validate()?;
        if let Some(step) = self.max_reward_rate_change {
            step.validate()?;
        }
        Ok(())
    }
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            reward_per_block: Amount::new(1_200_000_000_000_000_000),
            start_block: 0,
            vest_window_blocks: 5 * BLOCKS_PER_MONTH,
            non_vest_burn_rate: Rate::new(25_000),
            compound_fee_rate: Rate::new(5_000),
            referral_commission_rate: Rate::new(1_000),
            emission_budget: None,
            max_reward_rate_change: None,
        }
    }
}

/// Compensation distribution parameters.
///
/// Rewards are paid in the fee token out of the repay account's own
/// balance, which the operator funds ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepayConfig {
    /// Asset depositors stake to earn compensation.
    pub receipt_asset: Address,
    /// Reward tokens released per block.
    pub reward_per_block: Amount,
    /// First block that accrues rewards.
    pub start_block: u64,
}

impl RepayConfig {
    /// Validates all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ZeroAsset`] if the receipt asset is null.
    pub fn validate(&self) -> Result<(), DexError> {
        if self.receipt_asset.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        Ok(())
    }
}

impl Default for RepayConfig {
    fn default() -> Self {
        Self {
            receipt_asset: Address::from_label("repay:receipt"),
            reward_per_block: Amount::new(100_000_000_000_000_000),
            start_block: 0,
        }
    }
}
