//! Constant-product pair pool (Uniswap V2 style).
//!
//! A pool holds two assets and issues LP shares.  Shares are an asset in
//! their own right, identified by the pool address, so they live in the
//! same [`AssetMover`] as everything else.
//!
//! Mint, burn and swap use balance-delta accounting: the caller first
//! transfers assets to the pool address, then invokes the operation, which
//! compares current balances against the last synced reserves.
//!
//! # Guards
//!
//! | Guard | Measured as | Error |
//! |-------|-------------|-------|
//! | price | `|b0·r1 − r0·b1| · 1e6 / (r0·b1)` | [`DexError::ExcessiveDeviationFromPreviousPrice`] |
//! | liquidity | `Δshares · 1e6 / totalShares` | [`DexError::ExcessiveLiquidityDeviation`] |
//! | product | fee-adjusted `b0·b1 ≥ r0·r1` | [`DexError::InvariantViolation`] |

use ethnum::U256;
use tracing::{info, warn};

use crate::config::{PoolConfig, DEVIATION_MAGNIFIER};
use crate::domain::{Address, Amount, BlockClock, OperationKind, PairKey, Rate, FEE_MAGNIFIER};
use crate::error::DexError;
use crate::ledger::ReentrancyGuard;
use crate::math::{
    initial_shares, integer_sqrt, narrow, proportional_shares, redemption, widen,
    CheckedArithmetic, MINIMUM_LIQUIDITY,
};
use crate::traits::AssetMover;

/// Reserves are stored in 112 bits so that the UQ112x112 price fits.
pub const MAX_RESERVE: u128 = (1u128 << 112) - 1;

/// A constant-product pool for one [`PairKey`].
///
/// # State
///
/// - `reserve0` / `reserve1`: last synced balances
/// - `price0_cumulative` / `price1_cumulative`: UQ112x112 price × seconds, wrapping
/// - `k_last`: `reserve0 · reserve1` after the last liquidity event, for the protocol fee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    address: Address,
    key: PairKey,
    reserve0: Amount,
    reserve1: Amount,
    block_timestamp_last: u32,
    price0_cumulative: U256,
    price1_cumulative: U256,
    k_last: U256,
    swap_fee: Rate,
    price_change_limit: Option<u32>,
    liquidity_change_limit: Option<u32>,
    guard: ReentrancyGuard,
}

impl Pool {
    /// Creates an empty pool at `address`.
    #[must_use]
    pub fn new(address: Address, key: PairKey, config: &PoolConfig) -> Self {
        Self {
            address,
            key,
            reserve0: Amount::ZERO,
            reserve1: Amount::ZERO,
            block_timestamp_last: 0,
            price0_cumulative: U256::ZERO,
            price1_cumulative: U256::ZERO,
            k_last: U256::ZERO,
            swap_fee: config.swap_fee,
            price_change_limit: config.price_change_limit,
            liquidity_change_limit: config.liquidity_change_limit,
            guard: ReentrancyGuard::new("pool"),
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Pool address, also the LP-share asset.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The canonical asset pair.
    #[must_use]
    pub const fn key(&self) -> PairKey {
        self.key
    }

    /// Last synced reserves and timestamp.
    #[must_use]
    pub const fn reserves(&self) -> (Amount, Amount, u32) {
        (self.reserve0, self.reserve1, self.block_timestamp_last)
    }

    /// Reserves ordered as `(reserve_of(asset), reserve_of(other))`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidAsset`] if `asset` is not in the pair.
    pub fn reserves_for(&self, asset: &Address) -> Result<(Amount, Amount), DexError> {
        if self.key.is_first(asset)? {
            Ok((self.reserve0, self.reserve1))
        } else {
            Ok((self.reserve1, self.reserve0))
        }
    }

    /// Cumulative UQ112x112 prices.
    #[must_use]
    pub const fn price_cumulatives(&self) -> (U256, U256) {
        (self.price0_cumulative, self.price1_cumulative)
    }

    /// `reserve0 · reserve1` as of the last liquidity event with the protocol fee on.
    #[must_use]
    pub const fn k_last(&self) -> U256 {
        self.k_last
    }

    /// Swap fee.
    #[must_use]
    pub const fn swap_fee(&self) -> Rate {
        self.swap_fee
    }

    /// Price and liquidity deviation limits in ppm.
    #[must_use]
    pub const fn deviation_limits(&self) -> (Option<u32>, Option<u32>) {
        (self.price_change_limit, self.liquidity_change_limit)
    }

    /// Outstanding LP shares.
    pub fn total_shares<M: AssetMover>(&self, mover: &M) -> Amount {
        mover.total_supply(&self.address)
    }

    /// LP shares held by `holder`.
    pub fn share_balance<M: AssetMover>(&self, mover: &M, holder: &Address) -> Amount {
        mover.balance_of(&self.address, holder)
    }

    /// Applies new pool parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] if `config` is invalid.
    pub fn configure(&mut self, config: &PoolConfig) -> Result<(), DexError> {
        config.validate()?;
        self.swap_fee = config.swap_fee;
        self.price_change_limit = config.price_change_limit;
        self.liquidity_change_limit = config.liquidity_change_limit;
        Ok(())
    }

    // -- operations ---------------------------------------------------------

    /// Mints LP shares for whatever was transferred in since the last sync.
    ///
    /// The first mint locks [`MINIMUM_LIQUIDITY`] on the null address.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientLiquidityMinted`] if no shares result.
    /// - [`DexError::ExcessiveLiquidityDeviation`] if the liquidity guard trips.
    /// - [`DexError::Reentrancy`] if the pool is locked.
    pub fn mint<M: AssetMover>(
        &mut self,
        mover: &mut M,
        to: &Address,
        clock: &BlockClock,
        fee_to: Option<Address>,
    ) -> Result<Amount, DexError> {
        self.guard.enter()?;
        let out = self.mint_locked(mover, to, clock, fee_to);
        self.guard.exit();
        out
    }

    fn mint_locked<M: AssetMover>(
        &mut self,
        mover: &mut M,
        to: &Address,
        clock: &BlockClock,
        fee_to: Option<Address>,
    ) -> Result<Amount, DexError> {
        let (balance0, balance1) = self.balances(mover);
        let amount0 = balance0.safe_sub(&self.reserve0)?;
        let amount1 = balance1.safe_sub(&self.reserve1)?;

        let fee_on = self.mint_protocol_fee(mover, fee_to)?;
        let total = self.total_shares(mover);
        let shares = if total.is_zero() {
            let shares = initial_shares(amount0, amount1)?;
            mover.mint(&self.address, &Address::zero(), MINIMUM_LIQUIDITY)?;
            shares
        } else {
            let shares =
                proportional_shares(amount0, amount1, self.reserve0, self.reserve1, total)?;
            self.check_liquidity_change(shares, total)?;
            shares
        };
        mover.mint(&self.address, to, shares)?;

        self.update(balance0, balance1, clock)?;
        if fee_on {
            self.k_last = widen(self.reserve0) * widen(self.reserve1);
        }
        info!(pool = %self.address, to = %to, %amount0, %amount1, %shares, "liquidity minted");
        Ok(shares)
    }

    /// Redeems the LP shares held by the pool itself.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientLiquidityBurned`] if either side rounds to zero.
    /// - [`DexError::ExcessiveLiquidityDeviation`] if the liquidity guard trips.
    /// - [`DexError::Reentrancy`] if the pool is locked.
    pub fn burn<M: AssetMover>(
        &mut self,
        mover: &mut M,
        to: &Address,
        clock: &BlockClock,
        fee_to: Option<Address>,
    ) -> Result<(Amount, Amount), DexError> {
        self.guard.enter()?;
        let out = self.burn_locked(mover, to, clock, fee_to);
        self.guard.exit();
        out
    }

    fn burn_locked<M: AssetMover>(
        &mut self,
        mover: &mut M,
        to: &Address,
        clock: &BlockClock,
        fee_to: Option<Address>,
    ) -> Result<(Amount, Amount), DexError> {
        let (asset0, asset1) = (self.key.asset0(), self.key.asset1());
        let (balance0, balance1) = self.balances(mover);
        let shares = self.share_balance(mover, &self.address);

        let fee_on = self.mint_protocol_fee(mover, fee_to)?;
        let total = self.total_shares(mover);
        self.check_liquidity_change(shares, total)?;

        let amount0 = redemption(shares, balance0, total)?;
        let amount1 = redemption(shares, balance1, total)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(DexError::InsufficientLiquidityBurned);
        }
        mover.burn(&self.address, &self.address, shares)?;
        mover.transfer(&asset0, &self.address, to, amount0, OperationKind::RemoveLiquidity)?;
        mover.transfer(&asset1, &self.address, to, amount1, OperationKind::RemoveLiquidity)?;

        let (balance0, balance1) = self.balances(mover);
        self.update(balance0, balance1, clock)?;
        if fee_on {
            self.k_last = widen(self.reserve0) * widen(self.reserve1);
        }
        info!(pool = %self.address, to = %to, %amount0, %amount1, %shares, "liquidity burned");
        Ok((amount0, amount1))
    }

    /// Sends the requested outputs and checks that enough input arrived.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientOutputAmount`] if both outputs are zero.
    /// - [`DexError::InsufficientLiquidity`] if an output meets its reserve.
    /// - [`DexError::InsufficientInputAmount`] if nothing was paid in.
    /// - [`DexError::InvariantViolation`] if the fee-adjusted product shrinks.
    /// - [`DexError::ExcessiveDeviationFromPreviousPrice`] if the price guard trips.
    /// - [`DexError::Reentrancy`] if the pool is locked.
    pub fn swap<M: AssetMover>(
        &mut self,
        mover: &mut M,
        amount0_out: Amount,
        amount1_out: Amount,
        to: &Address,
        clock: &BlockClock,
    ) -> Result<(), DexError> {
        self.guard.enter()?;
        let out = self.swap_locked(mover, amount0_out, amount1_out, to, clock);
        self.guard.exit();
        out
    }

    fn swap_locked<M: AssetMover>(
        &mut self,
        mover: &mut M,
        amount0_out: Amount,
        amount1_out: Amount,
        to: &Address,
        clock: &BlockClock,
    ) -> Result<(), DexError> {
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(DexError::InsufficientOutputAmount {
                amount: Amount::ZERO,
                minimum: Amount::new(1),
            });
        }
        if amount0_out >= self.reserve0 || amount1_out >= self.reserve1 {
            return Err(DexError::InsufficientLiquidity);
        }
        let (asset0, asset1) = (self.key.asset0(), self.key.asset1());
        if *to == asset0 || *to == asset1 {
            return Err(DexError::InvalidAsset("swap recipient is a pool asset"));
        }

        if !amount0_out.is_zero() {
            mover.transfer(&asset0, &self.address, to, amount0_out, OperationKind::Swap)?;
        }
        if !amount1_out.is_zero() {
            mover.transfer(&asset1, &self.address, to, amount1_out, OperationKind::Swap)?;
        }
        let (balance0, balance1) = self.balances(mover);

        let amount0_in = balance0.saturating_sub(&self.reserve0.saturating_sub(&amount0_out));
        let amount1_in = balance1.saturating_sub(&self.reserve1.saturating_sub(&amount1_out));
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(DexError::InsufficientInputAmount);
        }
        if balance0.get() > MAX_RESERVE || balance1.get() > MAX_RESERVE {
            return Err(DexError::ArithmeticOverflow("reserve exceeds 112 bits"));
        }
        if !self.product_holds(balance0, balance1, amount0_in, amount1_in)? {
            warn!(pool = %self.address, "constant product violated");
            return Err(DexError::InvariantViolation);
        }
        self.check_price_change(balance0, balance1)?;

        self.update(balance0, balance1, clock)?;
        info!(
            pool = %self.address,
            to = %to,
            %amount0_in,
            %amount1_in,
            %amount0_out,
            %amount1_out,
            "swap executed"
        );
        Ok(())
    }

    /// Forces reserves to match current balances.
    ///
    /// # Errors
    ///
    /// - [`DexError::ArithmeticOverflow`] if a balance exceeds 112 bits.
    /// - [`DexError::Reentrancy`] if the pool is locked.
    pub fn sync<M: AssetMover>(&mut self, mover: &M, clock: &BlockClock) -> Result<(), DexError> {
        self.guard.enter()?;
        let (balance0, balance1) = self.balances(mover);
        let out = self.update(balance0, balance1, clock);
        self.guard.exit();
        out
    }

    // -- internals ----------------------------------------------------------

    fn balances<M: AssetMover>(&self, mover: &M) -> (Amount, Amount) {
        (
            mover.balance_of(&self.key.asset0(), &self.address),
            mover.balance_of(&self.key.asset1(), &self.address),
        )
    }

    /// Stores new reserves and advances the price accumulators.
    fn update(&mut self, balance0: Amount, balance1: Amount, clock: &BlockClock) -> Result<(), DexError> {
        if balance0.get() > MAX_RESERVE || balance1.get() > MAX_RESERVE {
            return Err(DexError::ArithmeticOverflow("reserve exceeds 112 bits"));
        }
        let now = clock.timestamp_u32();
        let elapsed = now.wrapping_sub(self.block_timestamp_last);
        if elapsed > 0 && !self.reserve0.is_zero() && !self.reserve1.is_zero() {
            let elapsed = U256::from(elapsed);
            let price0: U256 = (widen(self.reserve1) << 112) / widen(self.reserve0);
            let price1: U256 = (widen(self.reserve0) << 112) / widen(self.reserve1);
            self.price0_cumulative = self
                .price0_cumulative
                .wrapping_add(price0.wrapping_mul(elapsed));
            self.price1_cumulative = self
                .price1_cumulative
                .wrapping_add(price1.wrapping_mul(elapsed));
        }
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.block_timestamp_last = now;
        Ok(())
    }

    /// Checks `(b0·M − in0·f)·(b1·M − in1·f) ≥ r0·r1·M²`.
    ///
    /// Computed as `⌊A0·A1 / M⌋ ≥ r0·r1·M` with `A0` split by `M` so that no
    /// intermediate exceeds 256 bits for 112-bit balances.
    fn product_holds(
        &self,
        balance0: Amount,
        balance1: Amount,
        amount0_in: Amount,
        amount1_in: Amount,
    ) -> Result<bool, DexError> {
        let m = U256::from(FEE_MAGNIFIER);
        let f = U256::from(self.swap_fee.get());
        let adjusted0 = widen(balance0) * m - widen(amount0_in) * f;
        let adjusted1 = widen(balance1) * m - widen(amount1_in) * f;
        let lhs = (adjusted0 / m)
            .checked_mul(adjusted1)
            .and_then(|hi| hi.checked_add((adjusted0 % m) * adjusted1 / m))
            .ok_or(DexError::ArithmeticOverflow("product check"))?;
        let rhs = widen(self.reserve0) * widen(self.reserve1) * m;
        Ok(lhs >= rhs)
    }

    fn check_price_change(&self, balance0: Amount, balance1: Amount) -> Result<(), DexError> {
        let Some(limit) = self.price_change_limit else {
            return Ok(());
        };
        if self.reserve0.is_zero() || self.reserve1.is_zero() || balance1.is_zero() {
            return Ok(());
        }
        let before = widen(self.reserve0) * widen(balance1);
        let after = widen(balance0) * widen(self.reserve1);
        let diff = if after > before { after - before } else { before - after };
        let deviation = narrow(diff * U256::from(DEVIATION_MAGNIFIER) / before, "price deviation")?;
        if deviation.get() > u128::from(limit) {
            warn!(pool = %self.address, deviation = %deviation, limit, "price deviation rejected");
            return Err(DexError::ExcessiveDeviationFromPreviousPrice {
                deviation: deviation.get(),
                limit,
            });
        }
        Ok(())
    }

    fn check_liquidity_change(&self, change: Amount, total: Amount) -> Result<(), DexError> {
        let Some(limit) = self.liquidity_change_limit else {
            return Ok(());
        };
        if total.is_zero() {
            return Ok(());
        }
        let deviation = narrow(
            widen(change) * U256::from(DEVIATION_MAGNIFIER) / widen(total),
            "liquidity deviation",
        )?;
        if deviation.get() > u128::from(limit) {
            warn!(pool = %self.address, deviation = %deviation, limit, "liquidity deviation rejected");
            return Err(DexError::ExcessiveLiquidityDeviation {
                deviation: deviation.get(),
                limit,
            });
        }
        Ok(())
    }

    /// Mints one sixth of the growth in `√k` to `fee_to`.
    ///
    /// Returns whether the protocol fee is on.
    fn mint_protocol_fee<M: AssetMover>(
        &mut self,
        mover: &mut M,
        fee_to: Option<Address>,
    ) -> Result<bool, DexError> {
        let Some(fee_to) = fee_to else {
            self.k_last = U256::ZERO;
            return Ok(false);
        };
        if self.k_last != U256::ZERO {
            let root_k = integer_sqrt(widen(self.reserve0) * widen(self.reserve1));
            let root_k_last = integer_sqrt(self.k_last);
            if root_k > root_k_last {
                let total = widen(self.total_shares(mover));
                let numerator = total * (root_k - root_k_last);
                let denominator = root_k * U256::from(5u8) + root_k_last;
                let shares = narrow(numerator / denominator, "protocol fee")?;
                if !shares.is_zero() {
                    mover.mint(&self.address, &fee_to, shares)?;
                    info!(pool = %self.address, fee_to = %fee_to, %shares, "protocol fee minted");
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ONE;
    use crate::ledger::Ledger;

    #[derive(Clone)]
    struct Fixture {
        ledger: Ledger,
        pool: Pool,
        clock: BlockClock,
        lp: Address,
    }

    fn asset(b: u8) -> Address {
        Address::from_bytes([b; 32])
    }

    fn fixture(config: PoolConfig) -> Fixture {
        let Ok(key) = PairKey::new(asset(1), asset(2)) else {
            panic!("pair");
        };
        let mut ledger = Ledger::new(Address::from_label("native"), Address::from_label("wrapped"));
        let lp = Address::from_label("lp");
        for a in [asset(1), asset(2)] {
            let Ok(()) = ledger.credit(&a, &lp, Amount::new(1_000_000 * ONE)) else {
                panic!("credit");
            };
        }
        Fixture {
            ledger,
            pool: Pool::new(Address::from_label("pool"), key, &config),
            clock: BlockClock::new(1, 1_000),
            lp,
        }
    }

    fn deposit(f: &mut Fixture, a0: u128, a1: u128) -> Result<Amount, DexError> {
        let pool = f.pool.address();
        f.ledger.move_raw(&asset(1), &f.lp, &pool, Amount::new(a0))?;
        f.ledger.move_raw(&asset(2), &f.lp, &pool, Amount::new(a1))?;
        let lp = f.lp;
        f.pool.mint(&mut f.ledger, &lp, &f.clock, None)
    }

    fn withdraw(f: &mut Fixture, shares: Amount) -> Result<(Amount, Amount), DexError> {
        let pool = f.pool.address();
        f.ledger.move_raw(&pool, &f.lp, &pool, shares)?;
        let lp = f.lp;
        f.pool.burn(&mut f.ledger, &lp, &f.clock, None)
    }

    // -- mint ---------------------------------------------------------------

    #[test]
    fn first_mint_locks_minimum_liquidity() {
        let mut f = fixture(PoolConfig::default());
        let Ok(shares) = deposit(&mut f, 500 * ONE, 500 * ONE) else {
            panic!("mint");
        };
        assert_eq!(shares, Amount::new(500 * ONE - 1_000));
        assert_eq!(f.pool.share_balance(&f.ledger, &Address::zero()), MINIMUM_LIQUIDITY);
        assert_eq!(f.pool.total_shares(&f.ledger), Amount::new(500 * ONE));
        let (r0, r1, _) = f.pool.reserves();
        assert_eq!((r0, r1), (Amount::new(500 * ONE), Amount::new(500 * ONE)));
    }

    #[test]
    fn mint_without_input_fails() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 1_000_000, 1_000_000) else {
            panic!("mint");
        };
        let lp = f.lp;
        assert_eq!(
            f.pool.mint(&mut f.ledger, &lp, &f.clock, None),
            Err(DexError::InsufficientLiquidityMinted)
        );
    }

    #[test]
    fn liquidity_guard_rejects_large_mint() {
        let mut f = fixture(PoolConfig {
            liquidity_change_limit: Some(5_000),
            ..PoolConfig::default()
        });
        let Ok(_) = deposit(&mut f, 1_000 * ONE, 1_000 * ONE) else {
            panic!("first mint is unguarded");
        };
        let mut probe = f.clone();
        assert!(matches!(
            deposit(&mut probe, 10 * ONE, 10 * ONE),
            Err(DexError::ExcessiveLiquidityDeviation { limit: 5_000, .. })
        ));
        assert!(deposit(&mut f, ONE, ONE).is_ok());
    }

    // -- burn ---------------------------------------------------------------

    #[test]
    fn burn_returns_pro_rata() {
        let mut f = fixture(PoolConfig::default());
        let Ok(shares) = deposit(&mut f, 4_000_000, 1_000_000) else {
            panic!("mint");
        };
        assert_eq!(shares, Amount::new(2_000_000 - 1_000));
        let Ok((a0, a1)) = withdraw(&mut f, Amount::new(1_000_000)) else {
            panic!("burn");
        };
        assert_eq!((a0, a1), (Amount::new(2_000_000), Amount::new(500_000)));
    }

    #[test]
    fn burn_nothing_fails() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 1_000_000, 1_000_000) else {
            panic!("mint");
        };
        let lp = f.lp;
        assert_eq!(
            f.pool.burn(&mut f.ledger, &lp, &f.clock, None),
            Err(DexError::InsufficientLiquidityBurned)
        );
    }

    // -- swap ---------------------------------------------------------------

    fn pay_in(f: &mut Fixture, a: Address, amount: u128) {
        let pool = f.pool.address();
        let Ok(()) = f.ledger.move_raw(&a, &f.lp, &pool, Amount::new(amount)) else {
            panic!("pay in");
        };
    }

    #[test]
    fn swap_at_quote_succeeds_and_grows_k() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 5 * ONE, 10 * ONE) else {
            panic!("mint");
        };
        pay_in(&mut f, asset(1), ONE);
        let lp = f.lp;
        let Ok(()) = f.pool.swap(
            &mut f.ledger,
            Amount::ZERO,
            Amount::new(1_663_887_962_654_218_072),
            &lp,
            &f.clock,
        ) else {
            panic!("swap");
        };
        let (r0, r1, _) = f.pool.reserves();
        assert!(widen(r0) * widen(r1) >= widen(Amount::new(5 * ONE)) * widen(Amount::new(10 * ONE)));
    }

    #[test]
    fn swap_one_past_quote_violates_invariant() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 5 * ONE, 10 * ONE) else {
            panic!("mint");
        };
        pay_in(&mut f, asset(1), ONE);
        let lp = f.lp;
        assert_eq!(
            f.pool.swap(
                &mut f.ledger,
                Amount::ZERO,
                Amount::new(1_663_887_962_654_218_073),
                &lp,
                &f.clock,
            ),
            Err(DexError::InvariantViolation)
        );
    }

    #[test]
    fn swap_without_input_fails() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 5 * ONE, 10 * ONE) else {
            panic!("mint");
        };
        let lp = f.lp;
        assert_eq!(
            f.pool.swap(&mut f.ledger, Amount::ZERO, Amount::new(1), &lp, &f.clock),
            Err(DexError::InsufficientInputAmount)
        );
        assert_eq!(
            f.pool.swap(&mut f.ledger, Amount::ZERO, Amount::new(10 * ONE), &lp, &f.clock),
            Err(DexError::InsufficientLiquidity)
        );
    }

    #[test]
    fn price_guard_rejects_large_move() {
        let mut f = fixture(PoolConfig {
            price_change_limit: Some(5_000),
            ..PoolConfig::default()
        });
        let Ok(_) = deposit(&mut f, 1_000 * ONE, 100 * ONE) else {
            panic!("mint");
        };
        pay_in(&mut f, asset(1), 100 * ONE);
        let lp = f.lp;
        let out = crate::math::quote_output_amount(
            Amount::new(100 * ONE),
            Amount::new(1_000 * ONE),
            Amount::new(100 * ONE),
            Rate::new(200),
        );
        let Ok(out) = out else {
            panic!("quote");
        };
        assert!(matches!(
            f.pool.swap(&mut f.ledger, Amount::ZERO, out, &lp, &f.clock),
            Err(DexError::ExcessiveDeviationFromPreviousPrice { limit: 5_000, .. })
        ));
    }

    // -- accumulators & sync ------------------------------------------------

    #[test]
    fn cumulative_price_advances_with_time() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 1_000, 4_000) else {
            panic!("mint");
        };
        f.clock.advance(1, 10);
        let Ok(()) = f.pool.sync(&f.ledger, &f.clock) else {
            panic!("sync");
        };
        let (p0, p1) = f.pool.price_cumulatives();
        assert_eq!(p0, (U256::from(4u8) << 112) * U256::from(10u8));
        assert_eq!(p1, (U256::ONE << 112) / U256::from(4u8) * U256::from(10u8));
    }

    #[test]
    fn sync_absorbs_donation() {
        let mut f = fixture(PoolConfig::default());
        let Ok(_) = deposit(&mut f, 1_000_000, 1_000_000) else {
            panic!("mint");
        };
        pay_in(&mut f, asset(2), 500);
        let Ok(()) = f.pool.sync(&f.ledger, &f.clock) else {
            panic!("sync");
        };
        assert_eq!(f.pool.reserves().1, Amount::new(1_000_500));
    }

    #[test]
    fn protocol_fee_mints_to_fee_to_after_growth() {
        let mut f = fixture(PoolConfig::default());
        let fee_to = Address::from_label("fee-to");
        let pool = f.pool.address();
        let lp = f.lp;
        for a in [asset(1), asset(2)] {
            pay_in(&mut f, a, 1_000 * ONE);
        }
        let Ok(_) = f.pool.mint(&mut f.ledger, &lp, &f.clock, Some(fee_to)) else {
            panic!("mint");
        };
        assert_ne!(f.pool.k_last(), U256::ZERO);
        pay_in(&mut f, asset(1), 100 * ONE);
        let Ok(()) = f.pool.swap(&mut f.ledger, Amount::ZERO, Amount::new(90 * ONE), &lp, &f.clock)
        else {
            panic!("swap");
        };
        let Ok(()) = f.ledger.move_raw(&pool, &lp, &pool, Amount::new(ONE)) else {
            panic!("move shares");
        };
        let Ok(_) = f.pool.burn(&mut f.ledger, &lp, &f.clock, Some(fee_to)) else {
            panic!("burn");
        };
        assert!(!f.pool.share_balance(&f.ledger, &fee_to).is_zero());
    }
}
