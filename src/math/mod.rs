//! Arithmetic utilities for exchange calculations.
//!
//! - [`CheckedArithmetic`] for overflow-safe operations on [`Amount`](crate::domain::Amount)
//! - 256-bit helpers ([`mul_div`], [`integer_sqrt`]) built on `ethnum`
//! - constant-product formulas in [`reserve_math`]

mod checked;
pub mod reserve_math;
mod wide;

pub use checked::CheckedArithmetic;
pub use reserve_math::{
    initial_shares, proportional_shares, quote, quote_input_amount, quote_output_amount,
    redemption, MINIMUM_LIQUIDITY,
};
pub use wide::{integer_sqrt, mul_div, narrow, widen};
