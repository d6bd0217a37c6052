//! The exchange façade.
//!
//! [`Exchange`] owns every component and is the only place where they
//! meet.  Each mutating entry point runs through [`Exchange::atomically`]
//! naming the components it may touch; those are snapshotted first and
//! restored if the call fails, so a failed call leaves no partial state.
//!
//! # Accounts
//!
//! | Account | Acts as |
//! |---------|---------|
//! | `accounts.router` | caller of pool operations, may assert pool kinds |
//! | `accounts.farm` | custodian of farm deposits and emitted rewards |
//! | `accounts.repay` | custodian of compensation funds |
//! | `accounts.token` | the fee token and its liquidity bucket |

mod bank;
mod farming;
mod liquify;
mod snapshot;

pub use bank::Bank;
pub use farming::MassOutcome;
pub use snapshot::Touches;

use snapshot::Snapshot;

use tracing::{debug, info, warn};

use crate::config::{ExchangeConfig, PoolConfig};
use crate::domain::{Address, Amount, BlockClock, OperationKind, Rate};
use crate::error::DexError;
use crate::farm::{FarmAccountant, RepayAccountant};
use crate::ledger::Ledger;
use crate::pools::Pool;
use crate::registry::{AssetStatus, PoolRegistry};
use crate::router::{
    self, AddLiquidity, LiquidityAdded, RemoveLiquidity, Router, SwapExactIn, SwapExactOut,
};
use crate::token::{FeeRates, FeeRouter, FeeStores};
use crate::traits::{AssetMover, FromConfig};

/// Every component of the exchange plus the logical clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    config: ExchangeConfig,
    clock: BlockClock,
    ledger: Ledger,
    token: FeeRouter,
    registry: PoolRegistry,
    router: Router,
    farm: FarmAccountant,
    repay: RepayAccountant,
}

impl FromConfig<ExchangeConfig> for Exchange {
    fn from_config(config: &ExchangeConfig) -> Result<Self, DexError> {
        config.validate()?;
        let accounts = config.accounts;
        let mut registry = PoolRegistry::new(config.registry_id, config.owner, config.pool);
        registry.set_asset_status(&config.owner, accounts.token, AssetStatus::Enlisted)?;
        registry.set_asset_status(&config.owner, accounts.wrapped, AssetStatus::Enlisted)?;
        let exchange = Self {
            config: config.clone(),
            clock: BlockClock::new(config.farm.start_block, 0),
            ledger: Ledger::new(accounts.native, accounts.wrapped),
            token: FeeRouter::from_config(config)?,
            registry,
            router: Router::new(accounts.router),
            farm: FarmAccountant::from_config(config)?,
            repay: RepayAccountant::from_config(&config.repay)?,
        };
        info!(owner = %config.owner, token = %accounts.token, "exchange created");
        Ok(exchange)
    }
}

impl Exchange {
    /// Runs `op` against the engine, restoring the components in `scope`
    /// if it fails.  `op` must not mutate anything outside `scope`.
    ///
    /// The fee token's per-call transfer session is cleared either way.
    ///
    /// # Errors
    ///
    /// Whatever `op` returns.
    pub fn atomically<T>(
        &mut self,
        name: &'static str,
        scope: Touches,
        op: impl FnOnce(&mut Self) -> Result<T, DexError>,
    ) -> Result<T, DexError> {
        #[cfg(test)]
        let before = self.clone();
        let snapshot = Snapshot::take(self, scope);
        let out = op(self);
        #[cfg(test)]
        assert!(
            snapshot::only_scope_changed(&before, self, scope),
            "{name} changed state outside {scope:?}"
        );
        if let Err(err) = &out {
            warn!(operation = name, error = %err, "operation rolled back");
            snapshot.restore(self);
        }
        self.token.clear_session();
        out
    }

    fn only_owner(&self, caller: &Address) -> Result<(), DexError> {
        if *caller != self.config.owner {
            return Err(DexError::Forbidden("exchange owner"));
        }
        Ok(())
    }

    // -- clock and reads ----------------------------------------------------

    /// Moves the logical clock forward.
    pub fn advance_clock(&mut self, blocks: u64, seconds: u64) {
        self.clock.advance(blocks, seconds);
        debug!(block = self.clock.number(), timestamp = self.clock.timestamp(), "clock advanced");
    }

    /// Current block and timestamp.
    #[must_use]
    pub const fn clock(&self) -> &BlockClock {
        &self.clock
    }

    /// Configuration the engine was built from.
    #[must_use]
    pub const fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Non-token balances.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The fee token.
    #[must_use]
    pub const fn token(&self) -> &FeeRouter {
        &self.token
    }

    /// Pools and listings.
    #[must_use]
    pub const fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// The router.
    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// Farm books.
    #[must_use]
    pub const fn farm(&self) -> &FarmAccountant {
        &self.farm
    }

    /// Repay books.
    #[must_use]
    pub const fn repay(&self) -> &RepayAccountant {
        &self.repay
    }

    /// Balance of `account` in any asset, the fee token included.
    #[must_use]
    pub fn balance_of(&self, asset: &Address, account: &Address) -> Amount {
        if *asset == self.token.address() {
            self.token.balance_of(account)
        } else {
            self.ledger.balance_of(asset, account)
        }
    }

    /// Supply of any asset, the fee token included.
    #[must_use]
    pub fn total_supply(&self, asset: &Address) -> Amount {
        if *asset == self.token.address() {
            self.token.total_supply()
        } else {
            self.ledger.total_supply(asset)
        }
    }

    /// The pool for `(a, b)`, if created.
    #[must_use]
    pub fn pool(&self, a: Address, b: Address) -> Option<&Pool> {
        self.registry
            .get_pool(a, b)
            .and_then(|address| self.registry.pool(&address))
    }

    // -- fee token ----------------------------------------------------------

    /// Plain transfer of the fee token by its holder.
    ///
    /// Returns the net amount `to` received.  May trigger auto-liquify.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::transfer`].
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<Amount, DexError> {
        let net = self.atomically("transfer", Touches::TOKEN, |ex| ex.token.transfer(from, from, to, amount, None))?;
        self.liquify_if_due();
        Ok(net)
    }

    /// Several transfers from `from` in one call; the transfer cap counts
    /// their cumulative amount.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::transfer`]; nothing is transferred then.
    pub fn transfer_many(&mut self, from: &Address, transfers: &[(Address, Amount)]) -> Result<Vec<Amount>, DexError> {
        let nets = self.atomically("transfer many", Touches::TOKEN, |ex| {
            transfers
                .iter()
                .map(|(to, amount)| ex.token.transfer(from, from, to, *amount, None))
                .collect::<Result<Vec<_>, _>>()
        })?;
        self.liquify_if_due();
        Ok(nets)
    }

    /// Sets `spender`'s allowance over `owner`'s tokens.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ZeroAsset`] for a null spender.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<(), DexError> {
        self.atomically("approve", Touches::TOKEN, |ex| ex.token.approve(owner, spender, amount))
    }

    /// Transfer on an allowance.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::transfer_from`].
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Amount, DexError> {
        let net = self.atomically("transfer from", Touches::TOKEN, |ex| {
            ex.token.transfer_from(spender, owner, to, amount)
        })?;
        self.liquify_if_due();
        Ok(net)
    }

    /// Mints fee tokens; owner only at this surface.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::mint`].
    pub fn mint_token(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        self.atomically("mint token", Touches::TOKEN, |ex| ex.token.mint(caller, to, amount))
    }

    /// Burns fee tokens held by `from`.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::burn`].
    pub fn burn_token(&mut self, caller: &Address, from: &Address, amount: Amount) -> Result<(), DexError> {
        self.atomically("burn token", Touches::TOKEN, |ex| ex.token.burn(caller, from, amount))
    }

    /// Replaces one fee row.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::set_fee_rates`].
    pub fn set_fee_rates(&mut self, caller: &Address, kind: OperationKind, rates: FeeRates) -> Result<(), DexError> {
        self.token.set_fee_rates(caller, kind, rates)
    }

    /// Replaces the fee stores.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::set_fee_stores`].
    pub fn set_fee_stores(&mut self, caller: &Address, stores: FeeStores) -> Result<(), DexError> {
        self.token.set_fee_stores(caller, stores)
    }

    /// Flags or unflags an account.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::set_flagged`].
    pub fn set_flagged(&mut self, caller: &Address, account: Address, flagged: bool) -> Result<(), DexError> {
        self.token.set_flagged(caller, account, flagged)
    }

    /// Changes the transfer cap.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::set_max_transfer_rate`].
    pub fn set_max_transfer_rate(&mut self, caller: &Address, rate: Rate) -> Result<(), DexError> {
        self.token.set_max_transfer_rate(caller, rate)
    }

    /// Configures auto-liquify.
    ///
    /// # Errors
    ///
    /// Any error of [`FeeRouter::set_liquify`].
    pub fn set_liquify(
        &mut self,
        caller: &Address,
        threshold: Option<Amount>,
        paired_asset: Option<Address>,
    ) -> Result<(), DexError> {
        self.token.set_liquify(caller, threshold, paired_asset)
    }

    // -- external assets ----------------------------------------------------

    /// Issues an external asset (or native coin) to `to`; owner only.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::InvalidAsset`] for the fee token, the wrapped asset or
    ///   an LP share.
    pub fn mint_asset(&mut self, caller: &Address, asset: Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        self.only_owner(caller)?;
        if asset == self.token.address() || self.registry.is_pool(&asset) || asset == self.config.accounts.wrapped {
            return Err(DexError::InvalidAsset("asset is issued by the exchange"));
        }
        if asset.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        self.ledger.credit(&asset, to, amount)
    }

    /// Moves a non-token asset between accounts.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `from` holds less.
    pub fn transfer_asset(&mut self, asset: &Address, from: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        if *asset == self.token.address() {
            return Err(DexError::InvalidAsset("use the fee token transfer"));
        }
        self.ledger.move_raw(asset, from, to, amount)
    }

    /// Wraps native coin.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `account` holds less.
    pub fn deposit_native(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        self.atomically("deposit native", Touches::LEDGER, |ex| ex.ledger.deposit_native(account, amount))
    }

    /// Unwraps native coin.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if `account` holds less.
    pub fn withdraw_native(&mut self, account: &Address, amount: Amount) -> Result<(), DexError> {
        self.atomically("withdraw native", Touches::LEDGER, |ex| ex.ledger.withdraw_native(account, amount))
    }

    // -- registry -----------------------------------------------------------

    /// Creates the pool for `(a, b)`.
    ///
    /// # Errors
    ///
    /// Any error of [`PoolRegistry::create_pool`].
    pub fn create_pool(&mut self, a: Address, b: Address) -> Result<Address, DexError> {
        self.atomically("create pool", Touches::POOLS, |ex| ex.registry.create_pool(a, b))
    }

    /// Changes an asset's listing status.
    ///
    /// # Errors
    ///
    /// Any error of [`PoolRegistry::set_asset_status`].
    pub fn set_asset_status(&mut self, caller: &Address, asset: Address, status: AssetStatus) -> Result<(), DexError> {
        self.registry.set_asset_status(caller, asset, status)
    }

    /// Sets the protocol fee recipient.
    ///
    /// # Errors
    ///
    /// Any error of [`PoolRegistry::set_fee_to`].
    pub fn set_fee_to(&mut self, caller: &Address, fee_to: Option<Address>) -> Result<(), DexError> {
        self.registry.set_fee_to(caller, fee_to)
    }

    /// Hands the fee-to setter role over.
    ///
    /// # Errors
    ///
    /// Any error of [`PoolRegistry::set_fee_to_setter`].
    pub fn set_fee_to_setter(&mut self, caller: &Address, setter: Address) -> Result<(), DexError> {
        self.registry.set_fee_to_setter(caller, setter)
    }

    /// Replaces the parameters of every pool.
    ///
    /// # Errors
    ///
    /// Any error of [`PoolRegistry::set_pool_config`].
    pub fn set_pool_config(&mut self, caller: &Address, config: PoolConfig) -> Result<(), DexError> {
        self.atomically("set pool config", Touches::POOLS, |ex| ex.registry.set_pool_config(caller, config))
    }

    /// Sets the price and liquidity deviation limits in ppm.
    ///
    /// # Errors
    ///
    /// Any error of [`PoolRegistry::set_deviation_limits`].
    pub fn set_deviation_limits(
        &mut self,
        caller: &Address,
        price_change_limit: Option<u32>,
        liquidity_change_limit: Option<u32>,
    ) -> Result<(), DexError> {
        self.atomically("set deviation limits", Touches::POOLS, |ex| {
            ex.registry
                .set_deviation_limits(caller, price_change_limit, liquidity_change_limit)
        })
    }

    /// Forces a pool's reserves to its balances.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownPool`] for an unknown pool.
    pub fn sync(&mut self, pool: &Address) -> Result<(), DexError> {
        self.atomically("sync", Touches::POOLS, |ex| {
            let bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.config.accounts.router);
            ex.registry.pool_mut(pool)?.sync(&bank, &ex.clock)
        })
    }

    // -- router -------------------------------------------------------------

    /// `amount_a` of A priced in B at the pool's reserves.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownPool`] if the pair has no pool.
    /// - Any error of [`router::quote`].
    pub fn quote(&self, amount_a: Amount, asset_a: Address, asset_b: Address) -> Result<Amount, DexError> {
        let pool = self
            .pool(asset_a, asset_b)
            .ok_or(DexError::UnknownPool(self.registry.pool_address(asset_a, asset_b)?))?;
        let (reserve_a, reserve_b) = pool.reserves_for(&asset_a)?;
        router::quote(amount_a, reserve_a, reserve_b)
    }

    /// Hop outputs for `amount_in` along `path`.
    ///
    /// # Errors
    ///
    /// Any error of [`router::get_amounts_out`].
    pub fn get_amounts_out(&self, amount_in: Amount, path: &[Address]) -> Result<Vec<Amount>, DexError> {
        router::get_amounts_out(&self.registry, amount_in, path)
    }

    /// Hop inputs for `amount_out` along `path`.
    ///
    /// # Errors
    ///
    /// Any error of [`router::get_amounts_in`].
    pub fn get_amounts_in(&self, amount_out: Amount, path: &[Address]) -> Result<Vec<Amount>, DexError> {
        router::get_amounts_in(&self.registry, amount_out, path)
    }

    /// Supplies liquidity from `payer`.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::add_liquidity`].
    pub fn add_liquidity(&mut self, payer: &Address, params: &AddLiquidity) -> Result<LiquidityAdded, DexError> {
        self.atomically("add liquidity", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .add_liquidity(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Supplies liquidity against native coin.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::add_liquidity_native`].
    pub fn add_liquidity_native(&mut self, payer: &Address, params: &AddLiquidity) -> Result<LiquidityAdded, DexError> {
        self.atomically("add liquidity native", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .add_liquidity_native(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Redeems LP shares held by `payer`.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::remove_liquidity`].
    pub fn remove_liquidity(&mut self, payer: &Address, params: &RemoveLiquidity) -> Result<(Amount, Amount), DexError> {
        self.atomically("remove liquidity", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .remove_liquidity(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Redeems LP shares of a native pool, paying native coin.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::remove_liquidity_native`].
    pub fn remove_liquidity_native(&mut self, payer: &Address, params: &RemoveLiquidity) -> Result<(Amount, Amount), DexError> {
        self.atomically("remove liquidity native", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .remove_liquidity_native(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Exact-input swap; returns what the recipient received.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::swap_exact_tokens_for_tokens`].
    pub fn swap_exact_tokens_for_tokens(&mut self, payer: &Address, params: &SwapExactIn) -> Result<Amount, DexError> {
        self.atomically("swap exact tokens for tokens", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .swap_exact_tokens_for_tokens(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Exact-output swap; returns the gross input taken.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::swap_tokens_for_exact_tokens`].
    pub fn swap_tokens_for_exact_tokens(&mut self, payer: &Address, params: &SwapExactOut) -> Result<Amount, DexError> {
        self.atomically("swap tokens for exact tokens", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .swap_tokens_for_exact_tokens(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Exact native input swap.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::swap_exact_native_for_tokens`].
    pub fn swap_exact_native_for_tokens(&mut self, payer: &Address, params: &SwapExactIn) -> Result<Amount, DexError> {
        self.atomically("swap exact native for tokens", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .swap_exact_native_for_tokens(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Exact token input swap paying native.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::swap_exact_tokens_for_native`].
    pub fn swap_exact_tokens_for_native(&mut self, payer: &Address, params: &SwapExactIn) -> Result<Amount, DexError> {
        self.atomically("swap exact tokens for native", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .swap_exact_tokens_for_native(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Exact native output swap.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::swap_tokens_for_exact_native`].
    pub fn swap_tokens_for_exact_native(&mut self, payer: &Address, params: &SwapExactOut) -> Result<Amount, DexError> {
        self.atomically("swap tokens for exact native", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .swap_tokens_for_exact_native(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }

    /// Native input swap for an exact token output, refunding unused native.
    ///
    /// # Errors
    ///
    /// Any error of [`Router::swap_native_for_exact_tokens`].
    pub fn swap_native_for_exact_tokens(&mut self, payer: &Address, params: &SwapExactOut) -> Result<Amount, DexError> {
        self.atomically("swap native for exact tokens", Touches::MARKET, |ex| {
            let mut bank = Bank::new(&mut ex.ledger, &mut ex.token, ex.router.address());
            ex.router
                .swap_native_for_exact_tokens(&mut ex.registry, &mut bank, &ex.clock, payer, params)
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::ONE;

    pub(crate) fn owner() -> Address {
        Address::from_label("owner")
    }

    pub(crate) fn usdt() -> Address {
        Address::from_label("usdt")
    }

    /// Exchange with a funded owner and an enlisted `usdt`.
    pub(crate) fn exchange() -> Exchange {
        let mut cfg = ExchangeConfig::new(owner());
        cfg.fee_router.initial_supply = Amount::new(1_000_000 * ONE);
        cfg.backend_caller = Some(Address::from_label("backend"));
        let Ok(mut ex) = Exchange::from_config(&cfg) else {
            panic!("exchange");
        };
        let Ok(()) = ex.set_asset_status(&owner(), usdt(), AssetStatus::Enlisted) else {
            panic!("enlist");
        };
        let Ok(()) = ex.mint_asset(&owner(), usdt(), &owner(), Amount::new(1_000_000 * ONE)) else {
            panic!("mint usdt");
        };
        ex
    }

    pub(crate) fn seed_pool(ex: &mut Exchange, token_amount: u128, usdt_amount: u128) -> LiquidityAdded {
        let token = ex.token().address();
        let Ok(added) = ex.add_liquidity(
            &owner(),
            &AddLiquidity {
                asset_a: token,
                asset_b: usdt(),
                amount_a_desired: Amount::new(token_amount),
                amount_b_desired: Amount::new(usdt_amount),
                amount_a_min: Amount::ZERO,
                amount_b_min: Amount::ZERO,
                to: owner(),
                deadline: u64::MAX,
            },
        ) else {
            panic!("seed pool");
        };
        added
    }

    #[test]
    fn failed_call_rolls_back_everything() {
        let mut ex = exchange();
        let before = ex.clone();
        let token = ex.token().address();
        let err = ex.swap_exact_tokens_for_tokens(
            &owner(),
            &SwapExactIn {
                amount_in: Amount::new(ONE),
                amount_out_min: Amount::ZERO,
                path: vec![token, usdt()],
                to: owner(),
                deadline: u64::MAX,
            },
        );
        assert_eq!(err, Err(DexError::InvalidPath));
        assert_eq!(ex, before);
    }

    #[test]
    fn scoped_rollback_undoes_partial_changes() {
        let mut ex = exchange();
        let before = ex.clone();
        let out: Result<(), DexError> = ex.atomically("burn then fail", Touches::TOKEN, |ex| {
            ex.token.burn(&owner(), &owner(), Amount::new(ONE))?;
            Err(DexError::ZeroAmount)
        });
        assert_eq!(out, Err(DexError::ZeroAmount));
        assert_eq!(ex, before);
        let Ok(()) = ex.atomically("burn", Touches::TOKEN, |ex| {
            ex.token.burn(&owner(), &owner(), Amount::new(ONE))
        }) else {
            panic!("burn");
        };
        assert_eq!(
            ex.token().total_supply(),
            Amount::new(before.token().total_supply().get() - ONE)
        );
    }

    #[test]
    fn add_liquidity_creates_the_pool_and_charges_token_fees() {
        let mut ex = exchange();
        let added = seed_pool(&mut ex, 1_000 * ONE, 1_000 * ONE);
        let token = ex.token().address();
        let Some(pool) = ex.pool(token, usdt()) else {
            panic!("pool");
        };
        let (reserve_token, reserve_usdt) = match pool.reserves_for(&token) {
            Ok(r) => r,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(reserve_usdt, Amount::new(1_000 * ONE));
        assert!(reserve_token < added.amount_a);
        assert_eq!(ex.balance_of(&pool.address(), &owner()), added.shares);
    }

    #[test]
    fn exact_in_swap_through_the_token_pays_recipient() {
        let mut ex = exchange();
        seed_pool(&mut ex, 1_000 * ONE, 1_000 * ONE);
        let token = ex.token().address();
        let trader = Address::from_label("trader");
        let Ok(()) = ex.transfer_asset(&usdt(), &owner(), &trader, Amount::new(10 * ONE)) else {
            panic!("fund");
        };
        let Ok(received) = ex.swap_exact_tokens_for_tokens(
            &trader,
            &SwapExactIn {
                amount_in: Amount::new(10 * ONE),
                amount_out_min: Amount::new(9 * ONE),
                path: vec![usdt(), token],
                to: trader,
                deadline: u64::MAX,
            },
        ) else {
            panic!("swap");
        };
        assert_eq!(ex.balance_of(&token, &trader), received);
        assert_eq!(ex.balance_of(&usdt(), &trader), Amount::ZERO);
    }

    #[test]
    fn exact_out_swap_delivers_exact_amount() {
        let mut ex = exchange();
        seed_pool(&mut ex, 1_000 * ONE, 1_000 * ONE);
        let token = ex.token().address();
        let trader = Address::from_label("trader");
        let Ok(()) = ex.transfer_asset(&usdt(), &owner(), &trader, Amount::new(20 * ONE)) else {
            panic!("fund");
        };
        let Ok(_) = ex.swap_tokens_for_exact_tokens(
            &trader,
            &SwapExactOut {
                amount_out: Amount::new(5 * ONE),
                amount_in_max: Amount::new(20 * ONE),
                path: vec![usdt(), token],
                to: trader,
                deadline: u64::MAX,
            },
        ) else {
            panic!("swap");
        };
        assert!(ex.balance_of(&token, &trader) >= Amount::new(5 * ONE));
    }

    #[test]
    fn transfer_many_counts_against_the_cap() {
        let mut ex = exchange();
        let token = ex.token().address();
        let whale = Address::from_label("whale");
        let Ok(_) = ex.transfer(&owner(), &whale, Amount::new(200_000 * ONE)) else {
            panic!("fund");
        };
        let (a, b) = (Address::from_label("a"), Address::from_label("b"));
        let half_cap = Amount::new(25_000 * ONE);
        assert!(matches!(
            ex.transfer_many(&whale, &[(a, half_cap), (b, half_cap)]),
            Err(DexError::ExceedsMaxTransferAmount { .. })
        ));
        assert_eq!(ex.balance_of(&token, &a), Amount::ZERO);
        let Ok(_) = ex.transfer(&whale, &a, half_cap) else {
            panic!("first call");
        };
        let Ok(_) = ex.transfer(&whale, &b, half_cap) else {
            panic!("session cleared between calls");
        };
    }

    #[test]
    fn only_owner_issues_assets() {
        let mut ex = exchange();
        let stranger = Address::from_label("stranger");
        assert_eq!(
            ex.mint_asset(&stranger, usdt(), &stranger, Amount::new(1)),
            Err(DexError::Forbidden("exchange owner"))
        );
        let token = ex.token().address();
        assert!(ex.mint_asset(&owner(), token, &owner(), Amount::new(1)).is_err());
    }
}
