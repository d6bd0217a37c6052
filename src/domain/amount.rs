//! Raw asset quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Rounding;

/// One whole unit of an 18-decimal asset.
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// A quantity in an asset's smallest unit: balances, reserves, LP shares
/// and rewards alike.
///
/// The `checked_*` methods return `None` instead of wrapping; engine code
/// reaches them through [`CheckedArithmetic`](crate::math::CheckedArithmetic).
///
/// ```
/// use crosswise_dex::domain::{Amount, Rounding, ONE};
///
/// let stake = Amount::new(3 * ONE);
/// assert_eq!(stake.checked_div(&Amount::new(2), Rounding::Up), Some(Amount::new(3 * ONE / 2)));
/// assert_eq!(Amount::new(1).checked_sub(&stake), None);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const MAX: Self = Self(u128::MAX);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Difference clamped at zero; used where a shortfall means "nothing
    /// left", such as reward already covered by debt.
    pub const fn saturating_sub(&self, other: &Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Quotient rounded in `rounding`'s direction; `None` for a zero divisor.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        if divisor.0 == 0 {
            return None;
        }
        let floor = self.0 / divisor.0;
        // A remainder implies divisor > 1, so the ceiling cannot overflow.
        let ceil = matches!(rounding, Rounding::Up) && self.0 % divisor.0 != 0;
        Some(Self(floor + ceil as u128))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn share_split_rounds_both_ways() {
        let pot = Amount::new(10);
        let holders = Amount::new(3);
        assert_eq!(pot.checked_div(&holders, Rounding::Down), Some(Amount::new(3)));
        assert_eq!(pot.checked_div(&holders, Rounding::Up), Some(Amount::new(4)));
        assert_eq!(pot.checked_div(&Amount::ZERO, Rounding::Down), None);
        let Some(ceil) = Amount::MAX.checked_div(&Amount::new(2), Rounding::Up) else {
            panic!("ceiling of MAX / 2");
        };
        assert_eq!(ceil.get(), u128::MAX / 2 + 1);
    }

    #[test]
    fn balance_moves_fail_instead_of_wrapping() {
        let held = Amount::new(5 * ONE);
        assert_eq!(held.checked_sub(&Amount::new(6 * ONE)), None);
        assert_eq!(Amount::MAX.checked_add(&Amount::new(1)), None);
        assert_eq!(held.saturating_sub(&Amount::new(6 * ONE)), Amount::ZERO);
        assert_eq!(held.checked_add(&held), Some(Amount::new(10 * ONE)));
    }

    #[test]
    fn serializes_as_a_bare_integer() {
        let Ok(json) = serde_json::to_string(&Amount::new(42)) else {
            panic!("serialize");
        };
        assert_eq!(json, "42");
        assert_eq!(Amount::new(7 * ONE).to_string(), "7000000000000000000");
    }
}
