//! Parameters applied to every pool the registry creates.

use serde::{Deserialize, Serialize};

use crate::domain::Rate;
use crate::error::DexError;

/// Deviation limits are expressed in parts per million.
pub const DEVIATION_MAGNIFIER: u32 = 1_000_000;

/// Swap fee and deviation guards for new pools.
///
/// # Validation
///
/// - `swap_fee` must be below 100%.
/// - Limits, when set, must not exceed [`DEVIATION_MAGNIFIER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Fee retained by the pool on swap input (default 0.2%).
    pub swap_fee: Rate,
    /// Maximum reserve-ratio move per swap, in ppm; `None` disables.
    pub price_change_limit: Option<u32>,
    /// Maximum total-share change per mint or burn, in ppm; `None` disables.
    pub liquidity_change_limit: Option<u32>,
}

impl PoolConfig {
    /// Validates all invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] on the first violation.
    pub fn validate(&self) -> Result<(), DexError> {
        if self.swap_fee >= Rate::FULL {
            return Err(DexError::InvalidConfiguration("swap fee must be below 100%"));
        }
        for limit in [self.price_change_limit, self.liquidity_change_limit]
            .into_iter()
            .flatten()
        {
            if limit > DEVIATION_MAGNIFIER {
                return Err(DexError::InvalidConfiguration("deviation limit above 1e6 ppm"));
            }
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            swap_fee: Rate::new(200),
            price_change_limit: None,
            liquidity_change_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = PoolConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.swap_fee, Rate::new(200));
    }

    #[test]
    fn full_fee_rejected() {
        let cfg = PoolConfig {
            swap_fee: Rate::FULL,
            ..PoolConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_limit_rejected() {
        let cfg = PoolConfig {
            liquidity_change_limit: Some(DEVIATION_MAGNIFIER + 1),
            ..PoolConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
