//! Opaque account and asset identity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte identifier for an account, an asset, or a pool.
///
/// Assets and accounts share one namespace: a pool's address is also the
/// identity of its LP-share asset.  Ordering is lexicographic over the
/// bytes and drives canonical pair ordering.
///
/// # Examples
///
/// ```
/// use crosswise_dex::domain::Address;
///
/// let alice = Address::from_label("alice");
/// assert_eq!(alice, Address::from_label("alice"));
/// assert!(!alice.is_zero());
/// assert!(Address::zero().is_zero());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Address([u8; 32]);

impl Address {
    /// Creates an `Address` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derives an address from a human-readable label by hashing it.
    ///
    /// Useful for naming well-known accounts deterministically.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Returns the null address.
    ///
    /// Holds permanently locked LP shares and is rejected as an asset.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` for the null address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..6] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..")
    }
}
