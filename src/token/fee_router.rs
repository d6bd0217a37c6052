//! The fee token's transfer engine.
//!
//! Every movement of the fee token is classified into an
//! [`OperationKind`], charged the matching [`FeeTable`] row and split
//! between the fee stores.  The liquidity cut stays on the token's own
//! account (the *liquidity bucket*) until the engine auto-liquifies it.
//!
//! # Classification
//!
//! | Condition | Kind |
//! |-----------|------|
//! | `from` is flagged | `None` |
//! | pool kind requested by the router | requested |
//! | other kind requested by router, farm or repay | requested |
//! | anything else | `Transfer` |

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::{FeeRates, FeeSplit, FeeStores, FeeTable};
use crate::config::ExchangeConfig;
use crate::domain::{Address, Amount, OperationKind, Rate, Rounding, FEE_MAGNIFIER};
use crate::error::DexError;
use crate::ledger::{Book, ReentrancyGuard};
use crate::math::{mul_div, CheckedArithmetic};
use crate::traits::FromConfig;

/// Balances, allowances and fee routing of the fee token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeRouter {
    address: Address,
    owner: Address,
    router: Address,
    farm: Address,
    repay: Address,
    book: Book,
    allowances: BTreeMap<(Address, Address), Amount>,
    table: FeeTable,
    stores: FeeStores,
    flagged: BTreeSet<Address>,
    max_transfer_rate: Rate,
    session_sent: BTreeMap<Address, Amount>,
    liquify_threshold: Option<Amount>,
    paired_asset: Option<Address>,
    liquifying: bool,
    guard: ReentrancyGuard,
}

impl FromConfig<ExchangeConfig> for FeeRouter {
    fn from_config(config: &ExchangeConfig) -> Result<Self, DexError> {
        config.fee_router.validate()?;
        config.accounts.validate()?;
        let fr = &config.fee_router;
        let mut book = Book::new();
        if !fr.initial_supply.is_zero() {
            book.mint(&config.owner, fr.initial_supply)?;
        }
        Ok(Self {
            address: config.accounts.token,
            owner: config.owner,
            router: config.accounts.router,
            farm: config.accounts.farm,
            repay: config.accounts.repay,
            book,
            allowances: BTreeMap::new(),
            table: fr.table.clone(),
            stores: fr.stores,
            flagged: BTreeSet::new(),
            max_transfer_rate: fr.max_transfer_rate,
            session_sent: BTreeMap::new(),
            liquify_threshold: fr.liquify_threshold,
            paired_asset: fr.paired_asset,
            liquifying: false,
            guard: ReentrancyGuard::new("fee token"),
        })
    }
}

impl FeeRouter {
    // -- reads --------------------------------------------------------------

    /// The token's own address; also the asset id and the liquidity bucket.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.book.balance(account)
    }

    /// Total supply.
    #[must_use]
    pub const fn total_supply(&self) -> Amount {
        self.book.supply()
    }

    /// Remaining allowance of `spender` over `owner`'s balance.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// The fee schedule.
    #[must_use]
    pub const fn table(&self) -> &FeeTable {
        &self.table
    }

    /// Fee recipients.
    #[must_use]
    pub const fn stores(&self) -> &FeeStores {
        &self.stores
    }

    /// Liquidity fees accumulated but not yet liquified.
    #[must_use]
    pub fn liquidity_bucket(&self) -> Amount {
        self.book.balance(&self.address)
    }

    /// Returns `true` if `account` is charged the penalty row.
    #[must_use]
    pub fn is_flagged(&self, account: &Address) -> bool {
        self.flagged.contains(account)
    }

    /// Largest cumulative amount an account may send per call (exclusive).
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn max_transfer_amount(&self) -> Result<Amount, DexError> {
        self.max_transfer_rate.apply(self.total_supply())
    }

    /// Returns `true` for accounts exempt from the transfer cap.
    #[must_use]
    pub fn is_privileged(&self, account: &Address) -> bool {
        [self.owner, self.router, self.farm, self.repay, self.address].contains(account)
            || self.stores.contains(account)
    }

    /// Kind actually charged when `caller` moves tokens out of `from`.
    #[must_use]
    pub fn classify(
        &self,
        caller: &Address,
        from: &Address,
        requested: Option<OperationKind>,
    ) -> OperationKind {
        if self.is_flagged(from) {
            return OperationKind::None;
        }
        match requested {
            Some(kind) if kind.is_pool_kind() && *caller == self.router => kind,
            Some(kind)
                if !kind.is_pool_kind()
                    && kind != OperationKind::None
                    && [self.router, self.farm, self.repay].contains(caller) =>
            {
                kind
            }
            _ => OperationKind::Transfer,
        }
    }

    // -- transfers ----------------------------------------------------------

    /// Moves `amount` from `from` to `to`, charging the fee row of the
    /// classified kind.  Returns the net amount credited to `to`.
    ///
    /// # Errors
    ///
    /// - [`DexError::ZeroAsset`] if `to` is null.
    /// - [`DexError::TransferExceedsBalance`] if `from` holds less than `amount`.
    /// - [`DexError::ExceedsMaxTransferAmount`] if a plain transfer hits the cap.
    /// - [`DexError::Reentrancy`] if called while a transfer is in progress.
    pub fn transfer(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
        requested: Option<OperationKind>,
    ) -> Result<Amount, DexError> {
        self.guard.enter()?;
        let out = self.transfer_locked(caller, from, to, amount, requested);
        self.guard.exit();
        out
    }

    fn transfer_locked(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
        requested: Option<OperationKind>,
    ) -> Result<Amount, DexError> {
        if to.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(DexError::TransferExceedsBalance {
                available,
                requested: amount,
            });
        }
        let kind = self.classify(caller, from, requested);
        if kind == OperationKind::Transfer && !self.is_privileged(from) && !self.is_privileged(to)
        {
            self.charge_session(from, amount)?;
        }

        let split = self.table.rates(kind).split(amount)?;
        let net = amount.safe_sub(&split.total()?)?;
        self.route(from, &split)?;
        if !net.is_zero() {
            self.book.transfer(from, to, net)?;
        }
        info!(%from, %to, %amount, %net, %kind, "fee token transferred");
        Ok(net)
    }

    fn charge_session(&mut self, from: &Address, amount: Amount) -> Result<(), DexError> {
        let max = self.max_transfer_amount()?;
        let sent = self
            .session_sent
            .get(from)
            .copied()
            .unwrap_or_default()
            .safe_add(&amount)?;
        if sent >= max {
            warn!(account = %from, %sent, %max, "max transfer amount exceeded");
            return Err(DexError::ExceedsMaxTransferAmount { amount: sent, max });
        }
        self.session_sent.insert(*from, sent);
        Ok(())
    }

    fn route(&mut self, from: &Address, split: &FeeSplit) -> Result<(), DexError> {
        let cuts = [
            (self.stores.dev, split.dev),
            (self.stores.buyback, split.buyback),
            (self.address, split.liquidity),
            (self.stores.treasury, split.treasury),
        ];
        for (store, cut) in cuts {
            if !cut.is_zero() {
                self.book.transfer(from, &store, cut)?;
            }
        }
        debug!(dev = %split.dev, buyback = %split.buyback, liquidity = %split.liquidity, treasury = %split.treasury, "fees routed");
        Ok(())
    }

    /// Moves `amount` without classification, fees or cap.
    ///
    /// Reserved for the engine's own bookkeeping (auto-liquify, custody).
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn move_raw(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        if to.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        if amount.is_zero() {
            return Ok(());
        }
        self.book.transfer(from, to, amount)
    }

    /// Smallest gross amount whose net after the `kind` row is at least `net`.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidConfiguration`] if the row takes 100%.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn gross_up(&self, net: Amount, kind: OperationKind) -> Result<Amount, DexError> {
        let rates = self.table.rates(kind);
        if net.is_zero() || rates.total() == 0 {
            return Ok(net);
        }
        let total = u32::try_from(rates.total())
            .map_err(|_| DexError::InvalidConfiguration("fee row exceeds magnifier"))?;
        let retained = FEE_MAGNIFIER.saturating_sub(total);
        if retained == 0 {
            return Err(DexError::InvalidConfiguration("fee row takes everything"));
        }
        let mut gross = mul_div(
            net,
            Amount::new(u128::from(FEE_MAGNIFIER)),
            Amount::new(u128::from(retained)),
            Rounding::Up,
        )?;
        while gross > net && Self::net_of(&rates, gross.saturating_sub(&Amount::new(1)))? >= net {
            gross = gross.saturating_sub(&Amount::new(1));
        }
        Ok(gross)
    }

    fn net_of(rates: &FeeRates, gross: Amount) -> Result<Amount, DexError> {
        gross.safe_sub(&rates.split(gross)?.total()?)
    }

    /// Sets `spender`'s allowance over `owner`'s balance.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ZeroAsset`] if `spender` is null.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<(), DexError> {
        if spender.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    /// Moves `amount` from `owner` to `to` on `spender`'s allowance.
    ///
    /// The allowance is consumed by the gross amount; fees and cap apply as
    /// for a plain transfer initiated by `spender`.
    ///
    /// # Errors
    ///
    /// - [`DexError::TransferExceedsAllowance`] if the allowance is short.
    /// - Any error of [`FeeRouter::transfer`].
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Amount, DexError> {
        let allowance = self.allowance(owner, spender);
        let rest = allowance
            .checked_sub(&amount)
            .ok_or(DexError::TransferExceedsAllowance {
                allowance,
                requested: amount,
            })?;
        self.allowances.insert((*owner, *spender), rest);
        self.transfer(spender, owner, to, amount, None)
    }

    /// Forgets cumulative per-call amounts; called at the end of every
    /// engine entry point.
    pub fn clear_session(&mut self) {
        self.session_sent.clear();
    }

    // -- supply -------------------------------------------------------------

    /// Creates tokens; only the owner, farm and repay accountant may mint.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] for any other caller.
    /// - [`DexError::ArithmeticOverflow`] if supply overflows.
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        if ![self.owner, self.farm, self.repay].contains(caller) {
            return Err(DexError::Forbidden("fee token minter"));
        }
        if to.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        if amount.is_zero() {
            return Ok(());
        }
        self.book.mint(to, amount)?;
        debug!(%to, %amount, "fee token minted");
        Ok(())
    }

    /// Destroys tokens held by `from`; the holder, owner or farm may burn.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] for any other caller.
    /// - [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn burn(&mut self, caller: &Address, from: &Address, amount: Amount) -> Result<(), DexError> {
        if caller != from && *caller != self.owner && *caller != self.farm {
            return Err(DexError::Forbidden("fee token burner"));
        }
        if amount.is_zero() {
            return Ok(());
        }
        self.book.burn(from, amount)?;
        debug!(%from, %amount, "fee token burned");
        Ok(())
    }

    // -- auto-liquify -------------------------------------------------------

    /// Bucket amount to liquify now, if the threshold is met and no
    /// liquify is already running.
    #[must_use]
    pub fn liquify_due(&self) -> Option<(Amount, Address)> {
        let threshold = self.liquify_threshold?;
        let paired = self.paired_asset?;
        let bucket = self.liquidity_bucket();
        (!self.liquifying && bucket >= threshold).then_some((bucket, paired))
    }

    /// Marks a liquify as in progress.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Reentrancy`] if one already is.
    pub fn begin_liquify(&mut self) -> Result<(), DexError> {
        if self.liquifying {
            warn!("auto-liquify re-entered");
            return Err(DexError::Reentrancy("auto-liquify"));
        }
        self.liquifying = true;
        Ok(())
    }

    /// Clears the in-progress flag.
    pub fn end_liquify(&mut self) {
        self.liquifying = false;
    }

    // -- administration -----------------------------------------------------

    fn only_owner(&self, caller: &Address) -> Result<(), DexError> {
        if *caller != self.owner {
            return Err(DexError::Forbidden("fee token owner"));
        }
        Ok(())
    }

    /// Replaces the fee row for `kind`.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::InvalidConfiguration`] if the row exceeds 100%.
    pub fn set_fee_rates(
        &mut self,
        caller: &Address,
        kind: OperationKind,
        rates: FeeRates,
    ) -> Result<(), DexError> {
        self.only_owner(caller)?;
        self.table.set_rates(kind, rates)?;
        info!(%kind, ?rates, "fee rates updated");
        Ok(())
    }

    /// Replaces the fee stores.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::ZeroAsset`] if a store is null.
    pub fn set_fee_stores(&mut self, caller: &Address, stores: FeeStores) -> Result<(), DexError> {
        self.only_owner(caller)?;
        stores.validate()?;
        self.stores = stores;
        Ok(())
    }

    /// Flags or unflags `account`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Forbidden`] unless `caller` is the owner.
    pub fn set_flagged(&mut self, caller: &Address, account: Address, flagged: bool) -> Result<(), DexError> {
        self.only_owner(caller)?;
        if flagged {
            self.flagged.insert(account);
        } else {
            self.flagged.remove(&account);
        }
        Ok(())
    }

    /// Changes the per-call transfer cap.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::InvalidConfiguration`] if `rate` is zero or above 100%.
    pub fn set_max_transfer_rate(&mut self, caller: &Address, rate: Rate) -> Result<(), DexError> {
        self.only_owner(caller)?;
        rate.validate()?;
        if rate.is_zero() {
            return Err(DexError::InvalidConfiguration("max transfer rate is zero"));
        }
        self.max_transfer_rate = rate;
        Ok(())
    }

    /// Changes the auto-liquify threshold and paired asset.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Forbidden`] unless `caller` is the owner.
    pub fn set_liquify(
        &mut self,
        caller: &Address,
        threshold: Option<Amount>,
        paired_asset: Option<Address>,
    ) -> Result<(), DexError> {
        self.only_owner(caller)?;
        if matches!(threshold, Some(t) if t.is_zero()) {
            return Err(DexError::InvalidConfiguration("liquify threshold is zero"));
        }
        self.liquify_threshold = threshold;
        self.paired_asset = paired_asset;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ONE;

    fn owner() -> Address {
        Address::from_label("owner")
    }

    fn user(n: u8) -> Address {
        Address::from_bytes([n; 32])
    }

    fn config(supply: u128) -> ExchangeConfig {
        let mut cfg = ExchangeConfig::new(owner());
        cfg.fee_router.initial_supply = Amount::new(supply);
        cfg
    }

    fn token_with(supply: u128) -> FeeRouter {
        let Ok(t) = FeeRouter::from_config(&config(supply)) else {
            panic!("token");
        };
        t
    }

    fn funded(holder: Address, amount: u128) -> FeeRouter {
        let mut t = token_with(1_000_000 * ONE);
        let Ok(_) = t.transfer(&owner(), &owner(), &holder, Amount::new(amount), None) else {
            panic!("fund");
        };
        t.clear_session();
        t
    }

    // -- classification -----------------------------------------------------

    #[test]
    fn untrusted_callers_always_pay_transfer_row() {
        let t = token_with(0);
        let router = ExchangeConfig::new(owner()).accounts.router;
        let farm = ExchangeConfig::new(owner()).accounts.farm;
        assert_eq!(
            t.classify(&user(1), &user(1), Some(OperationKind::Swap)),
            OperationKind::Transfer
        );
        assert_eq!(
            t.classify(&router, &user(1), Some(OperationKind::Swap)),
            OperationKind::Swap
        );
        assert_eq!(
            t.classify(&farm, &user(1), Some(OperationKind::Swap)),
            OperationKind::Transfer
        );
        assert_eq!(
            t.classify(&farm, &farm, Some(OperationKind::HarvestAccumulated)),
            OperationKind::HarvestAccumulated
        );
    }

    #[test]
    fn flagged_sender_is_confiscated() {
        let mut t = funded(user(1), 10_000);
        let Ok(()) = t.set_flagged(&owner(), user(1), true) else {
            panic!("flag");
        };
        let Ok(net) = t.transfer(&user(1), &user(1), &user(2), Amount::new(100), None) else {
            panic!("transfer");
        };
        assert_eq!(net, Amount::ZERO);
        assert_eq!(t.balance_of(&t.stores().dev), Amount::new(4 + 100));
    }

    // -- fees ---------------------------------------------------------------

    #[test]
    fn plain_transfer_routes_four_three_three() {
        let mut t = token_with(1_000_000 * ONE);
        let stores = *t.stores();
        let Ok(net) = t.transfer(&owner(), &owner(), &user(1), Amount::new(10_000), None) else {
            panic!("transfer");
        };
        assert_eq!(net, Amount::new(9_990));
        assert_eq!(t.balance_of(&user(1)), Amount::new(9_990));
        assert_eq!(t.balance_of(&stores.dev), Amount::new(4));
        assert_eq!(t.balance_of(&stores.buyback), Amount::new(3));
        assert_eq!(t.liquidity_bucket(), Amount::new(3));
        assert_eq!(t.balance_of(&stores.treasury), Amount::ZERO);
        assert_eq!(t.total_supply(), Amount::new(1_000_000 * ONE));
    }

    #[test]
    fn insufficient_balance_checked_on_gross() {
        let mut t = funded(user(1), 100);
        assert_eq!(
            t.transfer(&user(1), &user(1), &user(2), Amount::new(10_000), None),
            Err(DexError::TransferExceedsBalance {
                available: Amount::new(100),
                requested: Amount::new(10_000),
            })
        );
    }

    #[test]
    fn gross_up_is_minimal() {
        let t = token_with(0);
        for net in [1u128, 999, 10_000, 123_456_789, ONE] {
            let Ok(gross) = t.gross_up(Amount::new(net), OperationKind::Swap) else {
                panic!("gross up");
            };
            let rates = t.table().rates(OperationKind::Swap);
            let Ok(got) = FeeRouter::net_of(&rates, gross) else {
                panic!("net");
            };
            assert!(got >= Amount::new(net));
            let Ok(less) = FeeRouter::net_of(&rates, gross.saturating_sub(&Amount::new(1))) else {
                panic!("net");
            };
            assert!(less < Amount::new(net));
        }
    }

    // -- cap ----------------------------------------------------------------

    #[test]
    fn cap_is_exclusive_and_cumulative() {
        let supply = 1_000_000u128;
        let mut t = token_with(supply);
        let Ok(_) = t.transfer(&owner(), &owner(), &user(1), Amount::new(200_000), None) else {
            panic!("fund");
        };
        t.clear_session();
        let Ok(max) = t.max_transfer_amount() else {
            panic!("max");
        };
        assert_eq!(max, Amount::new(50_000));
        assert!(t
            .transfer(&user(1), &user(1), &user(2), Amount::new(49_999), None)
            .is_ok());
        assert!(matches!(
            t.transfer(&user(1), &user(1), &user(2), Amount::new(1), None),
            Err(DexError::ExceedsMaxTransferAmount { .. })
        ));
        t.clear_session();
        assert!(matches!(
            t.transfer(&user(1), &user(1), &user(2), Amount::new(50_000), None),
            Err(DexError::ExceedsMaxTransferAmount { .. })
        ));
    }

    #[test]
    fn cap_skips_privileged_and_pool_kinds() {
        let mut t = token_with(1_000_000);
        let router = ExchangeConfig::new(owner()).accounts.router;
        let Ok(_) = t.transfer(&owner(), &owner(), &user(1), Amount::new(500_000), None) else {
            panic!("owner is uncapped");
        };
        let Ok(_) = t.transfer(
            &router,
            &user(1),
            &user(2),
            Amount::new(100_000),
            Some(OperationKind::Swap),
        ) else {
            panic!("swap kind is uncapped");
        };
    }

    // -- allowances ---------------------------------------------------------

    #[test]
    fn transfer_from_consumes_allowance() {
        let mut t = funded(user(1), 100_000);
        let Ok(()) = t.approve(&user(1), &user(3), Amount::new(50_000)) else {
            panic!("approve");
        };
        let Ok(net) = t.transfer_from(&user(3), &user(1), &user(2), Amount::new(10_000)) else {
            panic!("transfer_from");
        };
        assert_eq!(net, Amount::new(9_990));
        assert_eq!(t.allowance(&user(1), &user(3)), Amount::new(40_000));
        assert_eq!(
            t.transfer_from(&user(3), &user(1), &user(2), Amount::new(40_001)),
            Err(DexError::TransferExceedsAllowance {
                allowance: Amount::new(40_000),
                requested: Amount::new(40_001),
            })
        );
    }

    // -- supply and admin ---------------------------------------------------

    #[test]
    fn only_minters_mint() {
        let mut t = token_with(0);
        assert_eq!(
            t.mint(&user(1), &user(1), Amount::new(1)),
            Err(DexError::Forbidden("fee token minter"))
        );
        let Ok(()) = t.mint(&owner(), &user(1), Amount::new(7)) else {
            panic!("mint");
        };
        let Ok(()) = t.burn(&user(1), &user(1), Amount::new(2)) else {
            panic!("burn");
        };
        assert_eq!(t.total_supply(), Amount::new(5));
        assert!(t.burn(&user(2), &user(1), Amount::new(1)).is_err());
    }

    #[test]
    fn liquify_due_once_threshold_met() {
        let mut t = token_with(1_000_000 * ONE);
        let paired = Address::from_label("usdt");
        let Ok(()) = t.set_liquify(&owner(), Some(Amount::new(3)), Some(paired)) else {
            panic!("set");
        };
        assert_eq!(t.liquify_due(), None);
        let Ok(_) = t.transfer(&owner(), &owner(), &user(1), Amount::new(10_000), None) else {
            panic!("transfer");
        };
        assert_eq!(t.liquify_due(), Some((Amount::new(3), paired)));
        let Ok(()) = t.begin_liquify() else {
            panic!("begin");
        };
        assert_eq!(t.liquify_due(), None);
        assert_eq!(t.begin_liquify(), Err(DexError::Reentrancy("auto-liquify")));
        t.end_liquify();
        assert!(t.liquify_due().is_some());
    }

    #[test]
    fn setters_require_owner() {
        let mut t = token_with(0);
        assert!(t
            .set_fee_rates(&user(1), OperationKind::Transfer, FeeRates::default())
            .is_err());
        assert!(t.set_max_transfer_rate(&user(1), Rate::new(1)).is_err());
        let Ok(()) = t.set_fee_rates(&owner(), OperationKind::Transfer, FeeRates::default()) else {
            panic!("owner sets");
        };
        assert_eq!(t.table().rates(OperationKind::Transfer).total(), 0);
    }
}
