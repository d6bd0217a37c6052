//! The fee token.
//!
//! [`FeeRouter`] owns the token's balances and applies the per-kind
//! [`FeeTable`]; [`FeeStores`] name the accounts fees are routed to.

mod fee_router;
mod fee_table;

pub use fee_router::FeeRouter;
pub use fee_table::{FeeRates, FeeSplit, FeeStores, FeeTable};
