//! Liquidity and swap routing over registry pools.
//!
//! The [`Router`] never holds balances between calls.  Every operation
//! takes an explicit `payer`, moves the payer's assets straight into the
//! target pool and lets the pool pay the recipient.  Native variants route
//! through the router's own account only to wrap or unwrap, and leave it
//! empty again.
//!
//! | Operation | Bound checked | Error |
//! |-----------|---------------|-------|
//! | add liquidity | `amount_{a,b}_min` | `InsufficientAAmount` / `InsufficientBAmount` |
//! | remove liquidity | `amount_{a,b}_min` | `InsufficientAAmount` / `InsufficientBAmount` |
//! | exact-in swap | recipient's received amount | `InsufficientOutputAmount` |
//! | exact-out swap | payer's gross input | `ExcessiveInputAmount` |

mod params;
mod quoting;

pub use params::{AddLiquidity, RemoveLiquidity, SwapExactIn, SwapExactOut};
pub use quoting::{get_amounts_in, get_amounts_in_with, get_amounts_out, hop_pool};

pub use crate::math::quote;

use tracing::{info, warn};

use crate::domain::{Address, Amount, BlockClock, OperationKind};
use crate::error::DexError;
use crate::math::quote_output_amount;
use crate::registry::PoolRegistry;
use crate::traits::AssetMover;

/// Stateless router identified by its account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Router {
    address: Address,
}

/// Liquidity actually supplied and shares minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityAdded {
    /// A taken from the payer.
    pub amount_a: Amount,
    /// B taken from the payer.
    pub amount_b: Amount,
    /// Shares minted to the recipient.
    pub shares: Amount,
}

fn check_deadline(clock: &BlockClock, deadline: u64) -> Result<(), DexError> {
    if clock.timestamp() > deadline {
        warn!(deadline, now = clock.timestamp(), "deadline passed");
        return Err(DexError::Expired {
            deadline,
            now: clock.timestamp(),
        });
    }
    Ok(())
}

impl Router {
    /// Creates a router acting as `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    /// The router's account.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    // -- liquidity ----------------------------------------------------------

    /// Optimal `(amount_a, amount_b)` for `params` against current reserves.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientAAmount`] / [`DexError::InsufficientBAmount`]
    ///   if the optimal amount falls below its floor.
    /// - [`DexError::InvalidAsset`] if `asset_a` is not in the pool.
    pub fn liquidity_amounts(
        registry: &PoolRegistry,
        params: &AddLiquidity,
    ) -> Result<(Amount, Amount), DexError> {
        let reserves = match registry.get_pool(params.asset_a, params.asset_b) {
            Some(address) => registry
                .pool(&address)
                .ok_or(DexError::UnknownPool(address))?
                .reserves_for(&params.asset_a)?,
            None => (Amount::ZERO, Amount::ZERO),
        };
        let (reserve_a, reserve_b) = reserves;
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((params.amount_a_desired, params.amount_b_desired));
        }
        let b_optimal = quote(params.amount_a_desired, reserve_a, reserve_b)?;
        if b_optimal <= params.amount_b_desired {
            if b_optimal < params.amount_b_min {
                return Err(DexError::InsufficientBAmount {
                    amount: b_optimal,
                    minimum: params.amount_b_min,
                });
            }
            return Ok((params.amount_a_desired, b_optimal));
        }
        let a_optimal = quote(params.amount_b_desired, reserve_b, reserve_a)?;
        if a_optimal > params.amount_a_desired || a_optimal < params.amount_a_min {
            return Err(DexError::InsufficientAAmount {
                amount: a_optimal,
                minimum: params.amount_a_min,
            });
        }
        Ok((a_optimal, params.amount_b_desired))
    }

    /// Supplies liquidity, creating the pool on first use.
    ///
    /// # Errors
    ///
    /// - [`DexError::Expired`] past the deadline.
    /// - Any error of [`Router::liquidity_amounts`], pool creation or
    ///   [`Pool::mint`](crate::pools::Pool::mint).
    pub fn add_liquidity<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &AddLiquidity,
    ) -> Result<LiquidityAdded, DexError> {
        self.add_liquidity_from(registry, mover, clock, (payer, payer), params)
    }

    fn add_liquidity_from<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        (payer_a, payer_b): (&Address, &Address),
        params: &AddLiquidity,
    ) -> Result<LiquidityAdded, DexError> {
        check_deadline(clock, params.deadline)?;
        let pool_address = match registry.get_pool(params.asset_a, params.asset_b) {
            Some(address) => address,
            None => registry.create_pool(params.asset_a, params.asset_b)?,
        };
        let (amount_a, amount_b) = Self::liquidity_amounts(registry, params)?;
        mover.transfer(
            &params.asset_a,
            payer_a,
            &pool_address,
            amount_a,
            OperationKind::AddLiquidity,
        )?;
        mover.transfer(
            &params.asset_b,
            payer_b,
            &pool_address,
            amount_b,
            OperationKind::AddLiquidity,
        )?;
        let fee_to = registry.fee_to();
        let shares = registry
            .pool_mut(&pool_address)?
            .mint(mover, &params.to, clock, fee_to)?;
        info!(pool = %pool_address, %amount_a, %amount_b, %shares, "liquidity added");
        Ok(LiquidityAdded {
            amount_a,
            amount_b,
            shares,
        })
    }

    /// Supplies liquidity against the native asset.
    ///
    /// `params.asset_b` must be the wrapped asset; `amount_b_desired` native
    /// is taken from the payer, wrapped, and the unused part refunded.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidAsset`] if `asset_b` is not the wrapped asset.
    /// - Any error of [`Router::add_liquidity`].
    pub fn add_liquidity_native<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &AddLiquidity,
    ) -> Result<LiquidityAdded, DexError> {
        let (native, wrapped) = (mover.native_asset(), mover.wrapped_asset());
        if params.asset_b != wrapped {
            return Err(DexError::InvalidAsset("second asset must be the wrapped native"));
        }
        let value = params.amount_b_desired;
        mover.transfer(&native, payer, &self.address, value, OperationKind::AddLiquidity)?;
        mover.wrap(&self.address, value)?;
        let added =
            self.add_liquidity_from(registry, mover, clock, (payer, &self.address), params)?;
        self.refund_native(mover, payer)?;
        Ok(added)
    }

    /// Redeems LP shares held by the payer.
    ///
    /// Returns `(amount_a, amount_b)` paid by the pool.
    ///
    /// # Errors
    ///
    /// - [`DexError::Expired`] past the deadline.
    /// - [`DexError::UnknownPool`] if the pair has no pool.
    /// - [`DexError::InsufficientAAmount`] / [`DexError::InsufficientBAmount`]
    ///   below the floors.
    /// - Any error of [`Pool::burn`](crate::pools::Pool::burn).
    pub fn remove_liquidity<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &RemoveLiquidity,
    ) -> Result<(Amount, Amount), DexError> {
        check_deadline(clock, params.deadline)?;
        let pool_address = registry
            .get_pool(params.asset_a, params.asset_b)
            .ok_or(DexError::UnknownPool(
                registry.pool_address(params.asset_a, params.asset_b)?,
            ))?;
        mover.transfer(
            &pool_address,
            payer,
            &pool_address,
            params.shares,
            OperationKind::RemoveLiquidity,
        )?;
        let fee_to = registry.fee_to();
        let pool = registry.pool_mut(&pool_address)?;
        let a_is_first = pool.key().is_first(&params.asset_a)?;
        let (amount0, amount1) = pool.burn(mover, &params.to, clock, fee_to)?;
        let (amount_a, amount_b) = if a_is_first {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < params.amount_a_min {
            return Err(DexError::InsufficientAAmount {
                amount: amount_a,
                minimum: params.amount_a_min,
            });
        }
        if amount_b < params.amount_b_min {
            return Err(DexError::InsufficientBAmount {
                amount: amount_b,
                minimum: params.amount_b_min,
            });
        }
        info!(pool = %pool_address, shares = %params.shares, %amount_a, %amount_b, "liquidity removed");
        Ok((amount_a, amount_b))
    }

    /// Redeems LP shares of a `(token, wrapped)` pool, paying native.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidAsset`] if `asset_b` is not the wrapped asset.
    /// - Any error of [`Router::remove_liquidity`].
    pub fn remove_liquidity_native<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &RemoveLiquidity,
    ) -> Result<(Amount, Amount), DexError> {
        let (native, wrapped) = (mover.native_asset(), mover.wrapped_asset());
        if params.asset_b != wrapped {
            return Err(DexError::InvalidAsset("second asset must be the wrapped native"));
        }
        let via_router = RemoveLiquidity {
            to: self.address,
            ..*params
        };
        let (amount_token, amount_native) =
            self.remove_liquidity(registry, mover, clock, payer, &via_router)?;
        let held = mover.balance_of(&params.asset_a, &self.address);
        mover.transfer(
            &params.asset_a,
            &self.address,
            &params.to,
            held,
            OperationKind::RemoveLiquidity,
        )?;
        mover.unwrap(&self.address, amount_native)?;
        mover.transfer(
            &native,
            &self.address,
            &params.to,
            amount_native,
            OperationKind::RemoveLiquidity,
        )?;
        Ok((amount_token, amount_native))
    }

    // -- swaps --------------------------------------------------------------

    /// Swaps a fixed input along `params.path`.
    ///
    /// Each hop's input is measured from the pool's balance delta, so fee
    /// charged on the way in only shrinks the output.  Returns the amount
    /// the recipient actually received.
    ///
    /// # Errors
    ///
    /// - [`DexError::Expired`] past the deadline.
    /// - [`DexError::InvalidPath`] for a short or unroutable path.
    /// - [`DexError::InsufficientOutputAmount`] below `amount_out_min`.
    /// - Pool errors such as [`DexError::ExcessiveDeviationFromPreviousPrice`].
    pub fn swap_exact_tokens_for_tokens<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &SwapExactIn,
    ) -> Result<Amount, DexError> {
        check_deadline(clock, params.deadline)?;
        get_amounts_out(registry, params.amount_in, &params.path)?;
        let first_pool = hop_pool(registry, &params.path[0], &params.path[1])?.address();
        mover.transfer(
            &params.path[0],
            payer,
            &first_pool,
            params.amount_in,
            OperationKind::Swap,
        )?;
        self.finish_exact_in(registry, mover, clock, params)
    }

    fn finish_exact_in<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        params: &SwapExactIn,
    ) -> Result<Amount, DexError> {
        let output = params.path[params.path.len() - 1];
        let before = mover.balance_of(&output, &params.to);
        self.execute(registry, mover, clock, &params.path, None, &params.to)?;
        let received = mover.balance_of(&output, &params.to).saturating_sub(&before);
        if received < params.amount_out_min {
            return Err(DexError::InsufficientOutputAmount {
                amount: received,
                minimum: params.amount_out_min,
            });
        }
        info!(amount_in = %params.amount_in, %received, hops = params.path.len() - 1, "exact-in swap");
        Ok(received)
    }

    /// Swaps for a fixed output along `params.path`.
    ///
    /// Amounts handed between pools are grossed up through the mover so
    /// that fee-charging assets still deliver what each hop needs.  Returns
    /// the gross input taken from the payer.
    ///
    /// # Errors
    ///
    /// - [`DexError::Expired`] past the deadline.
    /// - [`DexError::InvalidPath`] for a short or unroutable path.
    /// - [`DexError::ExcessiveInputAmount`] above `amount_in_max`.
    /// - Pool errors such as [`DexError::ExcessiveDeviationFromPreviousPrice`].
    pub fn swap_tokens_for_exact_tokens<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &SwapExactOut,
    ) -> Result<Amount, DexError> {
        check_deadline(clock, params.deadline)?;
        let amounts = Self::plan_exact_out(registry, mover, params)?;
        let amount_in = mover.gross_up(&params.path[0], amounts[0], OperationKind::Swap)?;
        if amount_in > params.amount_in_max {
            return Err(DexError::ExcessiveInputAmount {
                amount: amount_in,
                maximum: params.amount_in_max,
            });
        }
        let first_pool = hop_pool(registry, &params.path[0], &params.path[1])?.address();
        mover.transfer(&params.path[0], payer, &first_pool, amount_in, OperationKind::Swap)?;
        self.execute(registry, mover, clock, &params.path, Some(&amounts), &params.to)?;
        info!(amount_out = %params.amount_out, %amount_in, hops = params.path.len() - 1, "exact-out swap");
        Ok(amount_in)
    }

    fn plan_exact_out<M: AssetMover>(
        registry: &PoolRegistry,
        mover: &M,
        params: &SwapExactOut,
    ) -> Result<Vec<Amount>, DexError> {
        get_amounts_in_with(registry, params.amount_out, &params.path, |asset, net| {
            mover.gross_up(asset, net, OperationKind::Swap)
        })
    }

    /// Swaps an exact native input; `params.path` must start at the wrapped asset.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPath`] if the path does not start at the wrapped asset.
    /// - Any error of [`Router::swap_exact_tokens_for_tokens`].
    pub fn swap_exact_native_for_tokens<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &SwapExactIn,
    ) -> Result<Amount, DexError> {
        check_deadline(clock, params.deadline)?;
        let wrapped = mover.wrapped_asset();
        if params.path.first() != Some(&wrapped) {
            return Err(DexError::InvalidPath);
        }
        get_amounts_out(registry, params.amount_in, &params.path)?;
        let native = mover.native_asset();
        mover.transfer(&native, payer, &self.address, params.amount_in, OperationKind::Swap)?;
        mover.wrap(&self.address, params.amount_in)?;
        let first_pool = hop_pool(registry, &params.path[0], &params.path[1])?.address();
        mover.transfer(&wrapped, &self.address, &first_pool, params.amount_in, OperationKind::Swap)?;
        self.finish_exact_in(registry, mover, clock, params)
    }

    /// Swaps an exact token input for native; `params.path` must end at the
    /// wrapped asset.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPath`] if the path does not end at the wrapped asset.
    /// - Any error of [`Router::swap_exact_tokens_for_tokens`].
    pub fn swap_exact_tokens_for_native<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &SwapExactIn,
    ) -> Result<Amount, DexError> {
        let wrapped = mover.wrapped_asset();
        if params.path.last() != Some(&wrapped) {
            return Err(DexError::InvalidPath);
        }
        let via_router = SwapExactIn {
            to: self.address,
            ..params.clone()
        };
        let received = self.swap_exact_tokens_for_tokens(registry, mover, clock, payer, &via_router)?;
        self.pay_native(mover, &params.to, received)?;
        Ok(received)
    }

    /// Swaps tokens for an exact native output; `params.path` must end at
    /// the wrapped asset.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPath`] if the path does not end at the wrapped asset.
    /// - Any error of [`Router::swap_tokens_for_exact_tokens`].
    pub fn swap_tokens_for_exact_native<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &SwapExactOut,
    ) -> Result<Amount, DexError> {
        let wrapped = mover.wrapped_asset();
        if params.path.last() != Some(&wrapped) {
            return Err(DexError::InvalidPath);
        }
        let via_router = SwapExactOut {
            to: self.address,
            ..params.clone()
        };
        let amount_in = self.swap_tokens_for_exact_tokens(registry, mover, clock, payer, &via_router)?;
        let received = mover.balance_of(&wrapped, &self.address);
        self.pay_native(mover, &params.to, received)?;
        Ok(amount_in)
    }

    /// Swaps at most `params.amount_in_max` native for an exact token
    /// output, refunding the unused native.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidPath`] if the path does not start at the wrapped asset.
    /// - Any error of [`Router::swap_tokens_for_exact_tokens`].
    pub fn swap_native_for_exact_tokens<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        payer: &Address,
        params: &SwapExactOut,
    ) -> Result<Amount, DexError> {
        check_deadline(clock, params.deadline)?;
        let wrapped = mover.wrapped_asset();
        if params.path.first() != Some(&wrapped) {
            return Err(DexError::InvalidPath);
        }
        let amounts = Self::plan_exact_out(registry, mover, params)?;
        let amount_in = amounts[0];
        if amount_in > params.amount_in_max {
            return Err(DexError::ExcessiveInputAmount {
                amount: amount_in,
                maximum: params.amount_in_max,
            });
        }
        let native = mover.native_asset();
        mover.transfer(&native, payer, &self.address, amount_in, OperationKind::Swap)?;
        mover.wrap(&self.address, amount_in)?;
        let first_pool = hop_pool(registry, &params.path[0], &params.path[1])?.address();
        mover.transfer(&wrapped, &self.address, &first_pool, amount_in, OperationKind::Swap)?;
        self.execute(registry, mover, clock, &params.path, Some(&amounts), &params.to)?;
        Ok(amount_in)
    }

    // -- internals ----------------------------------------------------------

    /// Runs every hop of `path`, with the first pool already paid.
    ///
    /// With `planned` the outputs are taken from it; otherwise each hop
    /// quotes its output from the input it actually received.
    fn execute<M: AssetMover>(
        &self,
        registry: &mut PoolRegistry,
        mover: &mut M,
        clock: &BlockClock,
        path: &[Address],
        planned: Option<&[Amount]>,
        to: &Address,
    ) -> Result<(), DexError> {
        let hops = path.len() - 1;
        for i in 0..hops {
            let (input, output) = (path[i], path[i + 1]);
            let pool_address = hop_pool(registry, &input, &output)?.address();
            let recipient = if i + 1 < hops {
                hop_pool(registry, &output, &path[i + 2])?.address()
            } else {
                *to
            };
            let pool = registry.pool_mut(&pool_address)?;
            let amount_out = match planned {
                Some(amounts) => amounts[i + 1],
                None => {
                    let (reserve_in, reserve_out) = pool.reserves_for(&input)?;
                    let amount_in = mover
                        .balance_of(&input, &pool_address)
                        .saturating_sub(&reserve_in);
                    quote_output_amount(amount_in, reserve_in, reserve_out, pool.swap_fee())?
                }
            };
            let (out0, out1) = if pool.key().is_first(&input)? {
                (Amount::ZERO, amount_out)
            } else {
                (amount_out, Amount::ZERO)
            };
            pool.swap(mover, out0, out1, &recipient, clock)?;
        }
        Ok(())
    }

    fn pay_native<M: AssetMover>(&self, mover: &mut M, to: &Address, amount: Amount) -> Result<(), DexError> {
        let native = mover.native_asset();
        mover.unwrap(&self.address, amount)?;
        mover.transfer(&native, &self.address, to, amount, OperationKind::Swap)?;
        Ok(())
    }

    fn refund_native<M: AssetMover>(&self, mover: &mut M, payer: &Address) -> Result<(), DexError> {
        let (native, wrapped) = (mover.native_asset(), mover.wrapped_asset());
        let leftover = mover.balance_of(&wrapped, &self.address);
        if !leftover.is_zero() {
            mover.unwrap(&self.address, leftover)?;
            mover.transfer(&native, &self.address, payer, leftover, OperationKind::AddLiquidity)?;
        }
        Ok(())
    }
}
