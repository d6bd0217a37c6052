//! The value-movement seam between pools, the router and the ledgers.

use crate::domain::{Address, Amount, OperationKind};
use crate::error::DexError;

/// Moves assets between accounts.
///
/// Pools and the router never touch balances directly; they go through an
/// `AssetMover`.  A fee-charging implementation may deliver less than the
/// gross amount, so [`AssetMover::transfer`] returns the net amount the
/// recipient actually received and callers that care measure balance
/// deltas.
pub trait AssetMover {
    /// Balance of `account` in `asset`.
    fn balance_of(&self, asset: &Address, account: &Address) -> Amount;

    /// Outstanding supply of `asset`.
    fn total_supply(&self, asset: &Address) -> Amount;

    /// Moves `amount` of `asset` from `from` to `to`, tagged with `kind`.
    ///
    /// Returns the net amount credited to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less than
    /// `amount`, or any error raised by fee routing.
    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
        kind: OperationKind,
    ) -> Result<Amount, DexError>;

    /// Creates `amount` of `asset` for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if supply overflows.
    fn mint(&mut self, asset: &Address, to: &Address, amount: Amount) -> Result<(), DexError>;

    /// Destroys `amount` of `asset` held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    fn burn(&mut self, asset: &Address, from: &Address, amount: Amount) -> Result<(), DexError>;

    /// Gross amount that must be sent so that `net` arrives after fees.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if the gross amount overflows.
    fn gross_up(
        &self,
        asset: &Address,
        net: Amount,
        kind: OperationKind,
    ) -> Result<Amount, DexError> {
        let _ = (asset, kind);
        Ok(net)
    }

    /// The native asset.
    fn native_asset(&self) -> Address;

    /// The wrapped form of the native asset.
    fn wrapped_asset(&self) -> Address;

    /// Converts `amount` native held by `account` into wrapped, 1:1.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `account` holds less.
    fn wrap(&mut self, account: &Address, amount: Amount) -> Result<(), DexError>;

    /// Converts `amount` wrapped held by `account` back to native, 1:1.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `account` holds less.
    fn unwrap(&mut self, account: &Address, amount: Amount) -> Result<(), DexError>;
}
