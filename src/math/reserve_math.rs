//! Constant-product pricing and LP-share formulas.
//!
//! Pure functions shared by [`Pool`](crate::pools::Pool) and the router.
//! All products are formed in 256 bits; results that leave the pool round
//! down and amounts the pool requires round up.
//!
//! | Quantity | Formula | Rounding |
//! |----------|---------|----------|
//! | output | `in·(M−f)·rOut / (rIn·M + in·(M−f))` | down |
//! | input | `rIn·out·M / ((rOut−out)·(M−f)) + 1` | up |
//! | first shares | `√(a0·a1) − MINIMUM_LIQUIDITY` | down |
//! | later shares | `min(a0·T/r0, a1·T/r1)` | down |
//! | redemption | `shares·balance / T` | down |

use ethnum::U256;
use tracing::debug;

use super::wide::{integer_sqrt, mul_div, narrow, widen};
use crate::domain::{Amount, Rate, Rounding, FEE_MAGNIFIER};
use crate::error::DexError;

/// LP shares locked forever on the first mint of every pool.
pub const MINIMUM_LIQUIDITY: Amount = Amount::new(1_000);

/// Returns the amount of B equivalent to `amount_a` at the reserve ratio.
///
/// # Errors
///
/// - [`DexError::ZeroAmount`] if `amount_a` is zero.
/// - [`DexError::InsufficientLiquidity`] if either reserve is zero.
pub fn quote(amount_a: Amount, reserve_a: Amount, reserve_b: Amount) -> Result<Amount, DexError> {
    if amount_a.is_zero() {
        return Err(DexError::ZeroAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    mul_div(amount_a, reserve_b, reserve_a, Rounding::Down)
}

/// Output received for `amount_in` after the swap fee.
///
/// # Errors
///
/// - [`DexError::InsufficientInputAmount`] if `amount_in` is zero.
/// - [`DexError::InsufficientLiquidity`] if either reserve is zero.
/// - [`DexError::InvalidConfiguration`] if `fee` exceeds 100%.
pub fn quote_output_amount(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: Rate,
) -> Result<Amount, DexError> {
    if amount_in.is_zero() {
        return Err(DexError::InsufficientInputAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    let retained = U256::from(fee.complement()?.get());
    let in_with_fee = widen(amount_in) * retained;
    let numerator = in_with_fee * widen(reserve_out);
    let denominator = widen(reserve_in) * U256::from(FEE_MAGNIFIER) + in_with_fee;
    let out = narrow(numerator / denominator, "quote output")?;
    debug!(amount_in = %amount_in, amount_out = %out, "quoted output");
    Ok(out)
}

/// Input required to receive exactly `amount_out` after the swap fee.
///
/// # Errors
///
/// - [`DexError::InsufficientOutputAmount`] if `amount_out` is zero.
/// - [`DexError::InsufficientLiquidity`] if reserves are zero or cannot
///   cover `amount_out`.
/// - [`DexError::InvalidConfiguration`] if `fee` is 100% or more.
pub fn quote_input_amount(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee: Rate,
) -> Result<Amount, DexError> {
    if amount_out.is_zero() {
        return Err(DexError::InsufficientOutputAmount {
            amount: Amount::ZERO,
            minimum: Amount::new(1),
        });
    }
    if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
        return Err(DexError::InsufficientLiquidity);
    }
    let retained = fee.complement()?;
    if retained.is_zero() {
        return Err(DexError::InvalidConfiguration("swap fee must be below 100%"));
    }
    let numerator = widen(reserve_in) * widen(amount_out) * U256::from(FEE_MAGNIFIER);
    let denominator = widen(reserve_out.saturating_sub(&amount_out)) * U256::from(retained.get());
    let amount_in = narrow(numerator / denominator + U256::ONE, "quote input")?;
    debug!(amount_out = %amount_out, amount_in = %amount_in, "quoted input");
    Ok(amount_in)
}

/// Shares minted to the first liquidity provider, before locking.
///
/// Returns `√(amount0·amount1) − MINIMUM_LIQUIDITY`.
///
/// # Errors
///
/// Returns [`DexError::InsufficientLiquidityMinted`] if the root does not
/// exceed [`MINIMUM_LIQUIDITY`].
pub fn initial_shares(amount0: Amount, amount1: Amount) -> Result<Amount, DexError> {
    let root = narrow(integer_sqrt(widen(amount0) * widen(amount1)), "initial shares")?;
    match root.checked_sub(&MINIMUM_LIQUIDITY) {
        Some(shares) if !shares.is_zero() => Ok(shares),
        _ => Err(DexError::InsufficientLiquidityMinted),
    }
}

/// Shares minted for a proportional deposit into a live pool.
///
/// # Errors
///
/// - [`DexError::InsufficientLiquidity`] if a reserve is zero.
/// - [`DexError::InsufficientLiquidityMinted`] if the result is zero.
pub fn proportional_shares(
    amount0: Amount,
    amount1: Amount,
    reserve0: Amount,
    reserve1: Amount,
    total_shares: Amount,
) -> Result<Amount, DexError> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return Err(DexError::InsufficientLiquidity);
    }
    let via0 = mul_div(amount0, total_shares, reserve0, Rounding::Down)?;
    let via1 = mul_div(amount1, total_shares, reserve1, Rounding::Down)?;
    let shares = via0.min(via1);
    if shares.is_zero() {
        return Err(DexError::InsufficientLiquidityMinted);
    }
    Ok(shares)
}

/// Pro-rata share of `balance` redeemed by `shares`.
///
/// # Errors
///
/// Returns [`DexError::DivisionByZero`] if `total_shares` is zero.
pub fn redemption(shares: Amount, balance: Amount, total_shares: Amount) -> Result<Amount, DexError> {
    mul_div(shares, balance, total_shares, Rounding::Down)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ONE;

    const FEE: Rate = Rate::new(200);

    #[test]
    fn output_matches_router_reference() {
        let Ok(out) = quote_output_amount(
            Amount::new(ONE),
            Amount::new(5 * ONE),
            Amount::new(10 * ONE),
            FEE,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(out, Amount::new(1_663_887_962_654_218_072));
    }

    #[test]
    fn input_rounds_up_by_one() {
        let Ok(amount_in) = quote_input_amount(
            Amount::new(ONE),
            Amount::new(5 * ONE),
            Amount::new(10 * ONE),
            FEE,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(amount_in, Amount::new(556_668_893_342_240_036));
    }

    #[test]
    fn tiny_input_on_even_pool() {
        let Ok(out) = quote_output_amount(Amount::new(2), Amount::new(10_000), Amount::new(10_000), FEE)
        else {
            panic!("expected Ok");
        };
        assert_eq!(out, Amount::new(1));
    }

    #[test]
    fn zero_inputs_rejected() {
        assert_eq!(
            quote_output_amount(Amount::ZERO, Amount::new(1), Amount::new(1), FEE),
            Err(DexError::InsufficientInputAmount)
        );
        assert_eq!(
            quote_output_amount(Amount::new(1), Amount::ZERO, Amount::new(1), FEE),
            Err(DexError::InsufficientLiquidity)
        );
        assert_eq!(
            quote_input_amount(Amount::new(10), Amount::new(10), Amount::new(10), FEE),
            Err(DexError::InsufficientLiquidity)
        );
    }

    #[test]
    fn input_then_output_covers_request() {
        let r_in = Amount::new(123_456_789);
        let r_out = Amount::new(987_654_321);
        let want = Amount::new(1_000_000);
        let Ok(amount_in) = quote_input_amount(want, r_in, r_out, FEE) else {
            panic!("expected Ok");
        };
        let Ok(got) = quote_output_amount(amount_in, r_in, r_out, FEE) else {
            panic!("expected Ok");
        };
        assert!(got >= want);
    }

    #[test]
    fn first_mint_locks_minimum() {
        let Ok(shares) = initial_shares(Amount::new(500 * ONE), Amount::new(500 * ONE)) else {
            panic!("expected Ok");
        };
        assert_eq!(shares, Amount::new(500 * ONE - 1_000));
        assert_eq!(
            initial_shares(Amount::new(1_000), Amount::new(1_000)),
            Err(DexError::InsufficientLiquidityMinted)
        );
    }

    #[test]
    fn proportional_takes_minimum_side() {
        let Ok(shares) = proportional_shares(
            Amount::new(100),
            Amount::new(300),
            Amount::new(1_000),
            Amount::new(1_000),
            Amount::new(1_000),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(shares, Amount::new(100));
    }

    #[test]
    fn quote_is_proportional() {
        assert_eq!(
            quote(Amount::new(10), Amount::new(100), Amount::new(250)),
            Ok(Amount::new(25))
        );
        assert_eq!(
            quote(Amount::ZERO, Amount::new(1), Amount::new(1)),
            Err(DexError::ZeroAmount)
        );
    }
}
