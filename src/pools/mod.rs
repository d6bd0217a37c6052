//! Pair pools.
//!
//! [`Pool`] is the constant-product reserve and LP-share engine for a
//! single asset pair.  Pools are created and indexed by the
//! [`PoolRegistry`](crate::registry::PoolRegistry).

mod pool;

pub use pool::{Pool, MAX_RESERVE};
