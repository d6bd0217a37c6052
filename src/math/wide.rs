//! 256-bit intermediates for products of 112/128-bit operands.

use ethnum::U256;

use crate::domain::{Amount, Rounding};
use crate::error::DexError;

/// Narrows a 256-bit value back to an [`Amount`].
///
/// # Errors
///
/// Returns [`DexError::ArithmeticOverflow`] if the value needs more than
/// 128 bits.
pub fn narrow(value: U256, context: &'static str) -> Result<Amount, DexError> {
    let (hi, lo) = value.into_words();
    if hi != 0 {
        return Err(DexError::ArithmeticOverflow(context));
    }
    Ok(Amount::new(lo))
}

/// Widens an amount.
#[inline]
#[must_use]
pub fn widen(amount: Amount) -> U256 {
    U256::from(amount.get())
}

/// Computes `a * b / c` with a 256-bit intermediate.
///
/// # Errors
///
/// - [`DexError::DivisionByZero`] if `c` is zero.
/// - [`DexError::ArithmeticOverflow`] if the quotient exceeds 128 bits.
pub fn mul_div(a: Amount, b: Amount, c: Amount, rounding: Rounding) -> Result<Amount, DexError> {
    if c.is_zero() {
        return Err(DexError::DivisionByZero);
    }
    let product = widen(a) * widen(b);
    let divisor = widen(c);
    let mut q = product / divisor;
    if rounding.is_up() && product % divisor != U256::ZERO {
        q += U256::ONE;
    }
    narrow(q, "mul_div quotient")
}

/// Floor integer square root by Newton's iteration.
///
/// Starts from `ceil(n / 2)` and stops once the iterate no longer
/// decreases.
#[must_use]
pub fn integer_sqrt(n: U256) -> U256 {
    if n == U256::ZERO {
        return U256::ZERO;
    }
    let mut x = n;
    let mut y = (n >> 1) + (n & U256::ONE);
    while y < x {
        x = y;
        y = (x + n / x) >> 1;
    }
    x
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_uses_wide_product() {
        let a = Amount::new(u128::MAX);
        let Ok(r) = mul_div(a, Amount::new(4), Amount::new(8), Rounding::Down) else {
            panic!("expected Ok");
        };
        assert_eq!(r, Amount::new(u128::MAX / 2));
    }

    #[test]
    fn mul_div_rounds_up() {
        assert_eq!(
            mul_div(Amount::new(10), Amount::new(1), Amount::new(3), Rounding::Up),
            Ok(Amount::new(4))
        );
    }

    #[test]
    fn mul_div_overflow_and_zero() {
        let max = Amount::MAX;
        assert!(matches!(
            mul_div(max, max, Amount::new(1), Rounding::Down),
            Err(DexError::ArithmeticOverflow(_))
        ));
        assert_eq!(
            mul_div(max, max, Amount::ZERO, Rounding::Down),
            Err(DexError::DivisionByZero)
        );
    }

    #[test]
    fn sqrt_small_values() {
        let expected = [0u128, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3];
        for (n, want) in expected.iter().enumerate() {
            assert_eq!(integer_sqrt(U256::from(n as u128)), U256::from(*want));
        }
    }

    #[test]
    fn sqrt_of_max_is_floor() {
        let r = integer_sqrt(U256::MAX);
        assert_eq!(r, U256::from(u128::MAX));
    }
}
