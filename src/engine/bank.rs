//! [`AssetMover`] over the ledger and the fee token.

use crate::domain::{Address, Amount, OperationKind};
use crate::error::DexError;
use crate::ledger::Ledger;
use crate::token::FeeRouter;
use crate::traits::AssetMover;

/// Dispatches fee-token movements to the [`FeeRouter`] and everything else
/// to the [`Ledger`], acting as `caller`.
///
/// `caller` decides which operation kinds the fee token honours: the
/// router may assert pool kinds, the farm and repay accounts farm kinds.
/// An exempt bank moves the fee token without classification, for the
/// engine's own bookkeeping.
#[derive(Debug)]
pub struct Bank<'a> {
    ledger: &'a mut Ledger,
    token: &'a mut FeeRouter,
    caller: Address,
    exempt: bool,
}

impl<'a> Bank<'a> {
    /// A bank acting as `caller`.
    pub fn new(ledger: &'a mut Ledger, token: &'a mut FeeRouter, caller: Address) -> Self {
        Self {
            ledger,
            token,
            caller,
            exempt: false,
        }
    }

    /// A bank moving the fee token without fees or cap.
    pub fn exempt(ledger: &'a mut Ledger, token: &'a mut FeeRouter, caller: Address) -> Self {
        Self {
            ledger,
            token,
            caller,
            exempt: true,
        }
    }

    fn is_token(&self, asset: &Address) -> bool {
        *asset == self.token.address()
    }
}

impl AssetMover for Bank<'_> {
    fn balance_of(&self, asset: &Address, account: &Address) -> Amount {
        if self.is_token(asset) {
            self.token.balance_of(account)
        } else {
            self.ledger.balance_of(asset, account)
        }
    }

    fn total_supply(&self, asset: &Address) -> Amount {
        if self.is_token(asset) {
            self.token.total_supply()
        } else {
            self.ledger.total_supply(asset)
        }
    }

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
        kind: OperationKind,
    ) -> Result<Amount, DexError> {
        if !self.is_token(asset) {
            self.ledger.move_raw(asset, from, to, amount)?;
            return Ok(amount);
        }
        if self.exempt {
            self.token.move_raw(from, to, amount)?;
            return Ok(amount);
        }
        self.token
            .transfer(&self.caller, from, to, amount, Some(kind))
    }

    fn mint(&mut self, asset: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        if self.is_token(asset) {
            self.token.mint(&self.caller, to, amount)
        } else {
            self.ledger.credit(asset, to, amount)
        }
    }

    fn burn(&mut self, asset: &Address, from: &Address, amount: Amount) -> Result<(), DexError> {
        if self.is_token(asset) {
            self.token.burn(&self.caller, from, amount)
        } else {
            self.ledger.debit(asset, from, amount)
        }
    }

    fn gross_up(&self, asset: &Address, net: Amount, kind: OperationKind) -> Result<Amount, DexError> {
        if !self.is_token(asset) || self.exempt {
            return Ok(net);
        }
        let charged = self.token.classify(&self.caller, &self.caller, Some(kind));
        self.token.gross_up(net, charged)
    }

    fn native_asset(&self) -> Address {
        self.ledger.native_asset()
    }

    fn wrapped_asset(&self) -> Address {
        self.ledger.wrapped_asset()
    }

    fn wrap(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        self.ledger.deposit_native(account, amount)
    }

    fn unwrap(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        self.ledger.withdraw_native(account, amount)
    }
}
