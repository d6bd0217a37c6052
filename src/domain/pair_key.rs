//! Canonically ordered pair of distinct assets.

use serde::{Deserialize, Serialize};

use super::Address;
use crate::error::DexError;

/// An unordered asset pair stored in canonical order (`asset0 < asset1`).
///
/// `(A, B)` and `(B, A)` produce the same key, so every lookup keyed by a
/// `PairKey` is order-independent.
///
/// # Examples
///
/// ```
/// use crosswise_dex::domain::{Address, PairKey};
///
/// let a = Address::from_bytes([1u8; 32]);
/// let b = Address::from_bytes([2u8; 32]);
/// let key = PairKey::new(b, a).expect("distinct assets");
/// assert_eq!(key.asset0(), a);
/// assert_eq!(key.asset1(), b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    asset0: Address,
    asset1: Address,
}

impl PairKey {
    /// Creates a canonically ordered key.
    ///
    /// # Errors
    ///
    /// - [`DexError::IdenticalAssets`] if `a == b`.
    /// - [`DexError::ZeroAsset`] if either side is the null address.
    pub fn new(a: Address, b: Address) -> Result<Self, DexError> {
        if a == b {
            return Err(DexError::IdenticalAssets);
        }
        let (asset0, asset1) = if a < b { (a, b) } else { (b, a) };
        if asset0.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        Ok(Self { asset0, asset1 })
    }

    /// Returns the lower-ordered asset.
    #[must_use]
    pub const fn asset0(&self) -> Address {
        self.asset0
    }

    /// Returns the higher-ordered asset.
    #[must_use]
    pub const fn asset1(&self) -> Address {
        self.asset1
    }

    /// Returns `true` if `asset` is one side of the pair.
    #[must_use]
    pub fn contains(&self, asset: &Address) -> bool {
        self.asset0 == *asset || self.asset1 == *asset
    }

    /// Returns `true` if `asset` is `asset0`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidAsset`] if `asset` is not in the pair.
    pub fn is_first(&self, asset: &Address) -> Result<bool, DexError> {
        if *asset == self.asset0 {
            Ok(true)
        } else if *asset == self.asset1 {
            Ok(false)
        } else {
            Err(DexError::InvalidAsset("asset is not part of this pair"))
        }
    }

    /// Returns the counterpart of `asset` in this pair.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidAsset`] if `asset` is not in the pair.
    pub fn other(&self, asset: &Address) -> Result<Address, DexError> {
        if self.is_first(asset)? {
            Ok(self.asset1)
        } else {
            Ok(self.asset0)
        }
    }
}
