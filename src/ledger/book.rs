//! Balance book for a single fungible asset.

use std::collections::BTreeMap;

use crate::domain::{Address, Amount};
use crate::error::DexError;
use crate::math::CheckedArithmetic;

/// Per-holder balances plus total supply for one asset.
///
/// `supply == Σ balances` holds after every operation; zero balances are
/// pruned so iteration only visits live holders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    balances: BTreeMap<Address, Amount>,
    supply: Amount,
}

impl Book {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `holder`.
    pub fn balance(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    /// Total outstanding supply.
    pub const fn supply(&self) -> Amount {
        self.supply
    }

    /// Iterates over every holder with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Creates `amount` for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if supply overflows.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), DexError> {
        self.supply = self.supply.safe_add(&amount)?;
        self.credit(to, amount)
    }

    /// Destroys `amount` held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn burn(&mut self, from: &Address, amount: Amount) -> Result<(), DexError> {
        self.debit(from, amount)?;
        self.supply = self.supply.safe_sub(&amount)?;
        Ok(())
    }

    fn debit(&mut self, holder: &Address, amount: Amount) -> Result<(), DexError> {
        let available = self.balance(holder);
        let rest = available
            .checked_sub(&amount)
            .ok_or(DexError::TransferExceedsBalance {
                available,
                requested: amount,
            })?;
        if rest.is_zero() {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, rest);
        }
        Ok(())
    }

    fn credit(&mut self, holder: &Address, amount: Amount) -> Result<(), DexError> {
        if amount.is_zero() {
            return Ok(());
        }
        let next = self.balance(holder).safe_add(&amount)?;
        self.balances.insert(*holder, next);
        Ok(())
    }
}
