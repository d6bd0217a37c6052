//! Fractions expressed against the 100 000 fee magnifier.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::DexError;

/// Scale for every fee, commission and allocation ratio (100 000 = 100%).
pub const FEE_MAGNIFIER: u32 = 100_000;

/// A ratio in units of 1 / [`FEE_MAGNIFIER`].
///
/// `Rate::new(40)` is 0.04%, `Rate::new(25_000)` is 25%.  Values above the
/// magnifier are representable but rejected by [`Rate::validate`].
///
/// ```
/// use crosswise_dex::domain::{Amount, Rate};
///
/// assert_eq!(Rate::new(40).apply(Amount::new(10_000)), Ok(Amount::new(4)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rate(u32);

impl Rate {
    /// 0%.
    pub const ZERO: Self = Self(0);

    /// 100%.
    pub const FULL: Self = Self(FEE_MAGNIFIER);

    /// Creates a rate from raw magnifier units.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw magnifier units.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The retained fraction, `FULL - self`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] above 100%.
    pub const fn complement(&self) -> Result<Self, DexError> {
        match FEE_MAGNIFIER.checked_sub(self.0) {
            Some(v) => Ok(Self(v)),
            None => Err(DexError::InvalidConfiguration("rate exceeds magnifier")),
        }
    }

    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] above 100%.
    pub const fn validate(&self) -> Result<(), DexError> {
        if self.0 > FEE_MAGNIFIER {
            return Err(DexError::InvalidConfiguration("rate exceeds magnifier"));
        }
        Ok(())
    }

    /// `amount · self / FEE_MAGNIFIER`, floored.  Every fee cut, burn and
    /// commission rounds in favour of the payer.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] if the product overflows.
    pub const fn apply(&self, amount: Amount) -> Result<Amount, DexError> {
        match amount.get().checked_mul(self.0 as u128) {
            Some(product) => Ok(Amount::new(product / FEE_MAGNIFIER as u128)),
            None => Err(DexError::ArithmeticOverflow("rate apply")),
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{FEE_MAGNIFIER}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuts_are_floored() {
        assert_eq!(Rate::new(30).apply(Amount::new(10_000)), Ok(Amount::new(3)));
        assert_eq!(Rate::new(30).apply(Amount::new(100)), Ok(Amount::ZERO));
        assert_eq!(Rate::new(25_000).apply(Amount::new(7)), Ok(Amount::new(1)));
    }

    #[test]
    fn oversized_product_is_an_error() {
        assert!(matches!(
            Rate::new(2).apply(Amount::MAX),
            Err(DexError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn bounded_by_the_magnifier() {
        assert_eq!(Rate::new(200).complement(), Ok(Rate::new(99_800)));
        assert!(Rate::new(FEE_MAGNIFIER + 1).complement().is_err());
        assert!(Rate::FULL.validate().is_ok());
        assert!(Rate::new(FEE_MAGNIFIER + 1).validate().is_err());
        assert_eq!(Rate::new(5_000).to_string(), "5000/100000");
    }
}
