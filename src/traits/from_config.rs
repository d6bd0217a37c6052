//! Validated construction from declarative configuration.
//!
//! Every stateful component of the engine is built through
//! [`FromConfig`], which validates the configuration before any state is
//! allocated.  A successfully constructed component is always in a valid
//! initial state.
//!
//! ```text
//! ExchangeConfig  => Exchange::from_config(&cfg)
//! FeeRouterConfig => FeeRouter::from_config(&cfg)
//! FarmConfig      => FarmAccountant::from_config(&cfg)
//! RepayConfig     => RepayAccountant::from_config(&cfg)
//! ```
//!
//! There is no blanket implementation; each pairing is explicit.

use crate::error::DexError;

/// Builds `Self` from a configuration of type `C`.
pub trait FromConfig<C> {
    /// Creates a new instance from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidConfiguration`] if any parameter is out of
    /// range or inconsistent.
    fn from_config(config: &C) -> Result<Self, DexError>
    where
        Self: Sized;
}
