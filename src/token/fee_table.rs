//! Per-operation fee schedule and fee-store accounts.
//!
//! The table maps every [`OperationKind`] to a [`FeeRates`] row of four
//! components in units of 1 / [`FEE_MAGNIFIER`]:
//!
//! | Kind | dev | buyback | liquidity | treasury |
//! |------|-----|---------|-----------|----------|
//! | `None` | 100 000 | 0 | 0 | 0 |
//! | `Swap` | 40 | 30 | 30 | 30 |
//! | `SwitchCollectOption`, `HarvestRepay` | 0 | 0 | 0 | 0 |
//! | every other kind | 40 | 30 | 30 | 0 |

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount, OperationKind, Rate, FEE_MAGNIFIER};
use crate::error::DexError;
use crate::math::CheckedArithmetic;

/// One row of the fee table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeRates {
    /// Share routed to the dev store.
    pub dev: Rate,
    /// Share routed to the buyback store.
    pub buyback: Rate,
    /// Share retained in the liquidity bucket.
    pub liquidity: Rate,
    /// Share routed to the treasury store.
    pub treasury: Rate,
}

/// Fee amounts computed for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    /// Dev store cut.
    pub dev: Amount,
    /// Buyback store cut.
    pub buyback: Amount,
    /// Liquidity bucket cut.
    pub liquidity: Amount,
    /// Treasury store cut.
    pub treasury: Amount,
}

impl FeeSplit {
    /// Sum of the four cuts.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn total(&self) -> Result<Amount, DexError> {
        self.dev
            .safe_add(&self.buyback)?
            .safe_add(&self.liquidity)?
            .safe_add(&self.treasury)
    }
}

impl FeeRates {
    /// Creates a row from raw magnifier units.
    #[must_use]
    pub const fn new(dev: u32, buyback: u32, liquidity: u32, treasury: u32) -> Self {
        Self {
            dev: Rate::new(dev),
            buyback: Rate::new(buyback),
            liquidity: Rate::new(liquidity),
            treasury: Rate::new(treasury),
        }
    }

    /// Sum of the four components in magnifier units.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.dev.get() as u64
            + self.buyback.get() as u64
            + self.liquidity.get() as u64
            + self.treasury.get() as u64
    }

    /// Rejects rows whose components sum above 100%.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] otherwise.
    pub const fn validate(&self) -> Result<(), DexError> {
        if self.total() > FEE_MAGNIFIER as u64 {
            return Err(DexError::InvalidConfiguration("fee row exceeds magnifier"));
        }
        Ok(())
    }

    /// Splits `amount` into floor-divided fee cuts.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn split(&self, amount: Amount) -> Result<FeeSplit, DexError> {
        Ok(FeeSplit {
            dev: self.dev.apply(amount)?,
            buyback: self.buyback.apply(amount)?,
            liquidity: self.liquidity.apply(amount)?,
            treasury: self.treasury.apply(amount)?,
        })
    }
}

/// Fee rows indexed by [`OperationKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTable {
    rows: [FeeRates; OperationKind::COUNT],
}

impl FeeTable {
    /// A table charging nothing for any kind.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            rows: [FeeRates::default(); OperationKind::COUNT],
        }
    }

    /// Row for `kind`.
    #[must_use]
    pub const fn rates(&self, kind: OperationKind) -> FeeRates {
        self.rows[kind.index()]
    }

    /// Replaces the row for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] if the row sums above 100%.
    pub fn set_rates(&mut self, kind: OperationKind, rates: FeeRates) -> Result<(), DexError> {
        rates.validate()?;
        self.rows[kind.index()] = rates;
        Ok(())
    }

    /// Validates every row.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] for the first bad row.
    pub fn validate(&self) -> Result<(), DexError> {
        self.rows.iter().try_for_each(FeeRates::validate)
    }
}

impl Default for FeeTable {
    fn default() -> Self {
        let mut rows = [FeeRates::new(40, 30, 30, 0); OperationKind::COUNT];
        rows[OperationKind::None.index()] = FeeRates::new(FEE_MAGNIFIER, 0, 0, 0);
        rows[OperationKind::Swap.index()] = FeeRates::new(40, 30, 30, 30);
        rows[OperationKind::SwitchCollectOption.index()] = FeeRates::default();
        rows[OperationKind::HarvestRepay.index()] = FeeRates::default();
        Self { rows }
    }
}

/// Accounts receiving routed fees.
///
/// The `liquidity` store receives LP shares produced by auto-liquify; the
/// liquidity fee itself accumulates on the token's own account until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStores {
    /// Developer fund.
    pub dev: Address,
    /// Buyback fund.
    pub buyback: Address,
    /// Recipient of auto-liquify LP shares.
    pub liquidity: Address,
    /// Treasury.
    pub treasury: Address,
}

impl FeeStores {
    /// Rejects null store accounts.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ZeroAsset`] if any store is the null address.
    pub fn validate(&self) -> Result<(), DexError> {
        if [self.dev, self.buyback, self.liquidity, self.treasury]
            .iter()
            .any(Address::is_zero)
        {
            return Err(DexError::ZeroAsset);
        }
        Ok(())
    }

    /// Returns `true` if `account` is one of the stores.
    #[must_use]
    pub fn contains(&self, account: &Address) -> bool {
        [self.dev, self.buyback, self.liquidity, self.treasury].contains(account)
    }
}

impl Default for FeeStores {
    fn default() -> Self {
        Self {
            dev: Address::from_label("store:dev"),
            buyback: Address::from_label("store:buyback"),
            liquidity: Address::from_label("store:liquidity"),
            treasury: Address::from_label("store:treasury"),
        }
    }
}
