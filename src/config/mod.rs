//! Declarative, validated engine configuration.
//!
//! [`ExchangeConfig`] aggregates one section per component.  Every struct
//! derives `serde` traits and exposes `validate()`; `Default` reproduces
//! the production deployment values.

mod exchange;
mod farm;
mod fee_router;
mod pool;

pub use exchange::{Accounts, ExchangeConfig};
pub use farm::{FarmConfig, RepayConfig, BLOCKS_PER_MONTH};
pub use fee_router::FeeRouterConfig;
pub use pool::{PoolConfig, DEVIATION_MAGNIFIER};
