//! Fee-token configuration.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, Rate};
use crate::error::DexError;
use crate::token::{FeeStores, FeeTable};

/// Fee schedule, fee stores and transfer limits of the fee token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRouterConfig {
    /// Fee rows per operation kind.
    pub table: FeeTable,
    /// Fee recipients.
    pub stores: FeeStores,
    /// Per-call cap on plain transfers as a share of supply (default 5%).
    pub max_transfer_rate: Rate,
    /// Liquidity bucket size that triggers auto-liquify; `None` disables.
    pub liquify_threshold: Option<Amount>,
    /// Asset paired with the fee token for auto-liquify.
    pub paired_asset: Option<Address>,
    /// Fee-token supply minted to the owner at construction.
    pub initial_supply: Amount,
}

impl FeeRouterConfig {
    /// Validates all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] or [`DexError::ZeroAsset`]
    /// on the first violation.
    pub fn validate(&self) -> Result<(), DexError> {
        self.table.validate()?;
        self.stores.validate()?;
        self.max_transfer_rate.validate()?;
        if self.max_transfer_rate.is_zero() {
            return Err(DexError::InvalidConfiguration("max transfer rate is zero"));
        }
        if matches!(self.liquify_threshold, Some(t) if t.is_zero()) {
            return Err(DexError::InvalidConfiguration("liquify threshold is zero"));
        }
        if matches!(self.paired_asset, Some(a) if a.is_zero()) {
            return Err(DexError::ZeroAsset);
        }
        Ok(())
    }
}

impl Default for FeeRouterConfig {
    fn default() -> Self {
        Self {
            table: FeeTable::default(),
            stores: FeeStores::default(),
            max_transfer_rate: Rate::new(5_000),
            liquify_threshold: None,
            paired_asset: None,
            initial_supply: Amount::ZERO,
        }
    }
}
