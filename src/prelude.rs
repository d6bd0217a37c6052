//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use crosswise_dex::prelude::*;
//! ```

pub use crate::config::ExchangeConfig;
pub use crate::domain::{Address, Amount, BlockClock, OperationKind, Rate, Rounding, ONE};
pub use crate::engine::Exchange;
pub use crate::error::{DexError, ErrorKind, Result};
pub use crate::farm::CollectOption;
pub use crate::math::CheckedArithmetic;
pub use crate::traits::{AssetMover, FromConfig};
