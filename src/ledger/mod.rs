//! Multi-asset balance ledger.
//!
//! Holds a [`Book`] per asset, including the native asset, its wrapped
//! form and every pool's LP shares (a pool's address doubles as its
//! share asset).  The fee token keeps its own book inside
//! [`FeeRouter`](crate::token::FeeRouter).

mod book;
mod guard;

use std::collections::BTreeMap;

pub use book::Book;
pub use guard::ReentrancyGuard;

use crate::domain::{Address, Amount, OperationKind};
use crate::error::DexError;
use crate::traits::AssetMover;

/// Balances of every asset other than the fee token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    books: BTreeMap<Address, Book>,
    native: Address,
    wrapped: Address,
}

impl Ledger {
    /// Creates an empty ledger with the given native and wrapped assets.
    ///
    /// Native coins backing wrapped balances are held by the `wrapped`
    /// address itself.
    #[must_use]
    pub fn new(native: Address, wrapped: Address) -> Self {
        Self {
            books: BTreeMap::new(),
            native,
            wrapped,
        }
    }

    /// The book for `asset`, if anything was ever minted.
    #[must_use]
    pub fn book(&self, asset: &Address) -> Option<&Book> {
        self.books.get(asset)
    }

    fn book_mut(&mut self, asset: &Address) -> &mut Book {
        self.books.entry(*asset).or_default()
    }

    /// Balance of `account` in `asset`.
    pub fn balance_of(&self, asset: &Address, account: &Address) -> Amount {
        self.books
            .get(asset)
            .map(|b| b.balance(account))
            .unwrap_or_default()
    }

    /// Total supply of `asset`.
    pub fn total_supply(&self, asset: &Address) -> Amount {
        self.books.get(asset).map(Book::supply).unwrap_or_default()
    }

    /// Moves `amount` of `asset` without fees.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn move_raw(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), DexError> {
        if to.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        self.book_mut(asset).transfer(from, to, amount)
    }

    /// Creates `amount` of `asset` for `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if supply overflows.
    pub fn credit(&mut self, asset: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        self.book_mut(asset).mint(to, amount)
    }

    /// Destroys `amount` of `asset` held by `from`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn debit(&mut self, asset: &Address, from: &Address, amount: Amount) -> Result<(), DexError> {
        self.book_mut(asset).burn(from, amount)
    }

    /// Wraps `amount` native coins held by `account`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `account` holds less.
    pub fn deposit_native(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        let (native, wrapped) = (self.native, self.wrapped);
        self.book_mut(&native).transfer(account, &wrapped, amount)?;
        self.book_mut(&wrapped).mint(account, amount)
    }

    /// Unwraps `amount` wrapped coins held by `account`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `account` holds less.
    pub fn withdraw_native(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        let (native, wrapped) = (self.native, self.wrapped);
        self.book_mut(&wrapped).burn(account, amount)?;
        self.book_mut(&native).transfer(&wrapped, account, amount)
    }
}

impl AssetMover for Ledger {
    fn balance_of(&self, asset: &Address, account: &Address) -> Amount {
        Ledger::balance_of(self, asset, account)
    }

    fn total_supply(&self, asset: &Address) -> Amount {
        Ledger::total_supply(self, asset)
    }

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
        _kind: OperationKind,
    ) -> Result<Amount, DexError> {
        self.move_raw(asset, from, to, amount)?;
        Ok(amount)
    }

    fn mint(&mut self, asset: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        self.credit(asset, to, amount)
    }

    fn burn(&mut self, asset: &Address, from: &Address, amount: Amount) -> Result<(), DexError> {
        self.debit(asset, from, amount)
    }

    fn native_asset(&self) -> Address {
        self.native
    }

    fn wrapped_asset(&self) -> Address {
        self.wrapped
    }

    fn wrap(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        self.deposit_native(account, amount)
    }

    fn unwrap(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        self.withdraw_native(account, amount)
    }
}
