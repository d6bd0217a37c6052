//! Fundamental value types used throughout the exchange engine.
//!
//! All quantities are newtypes with checked arithmetic; identities are
//! opaque 32-byte addresses with a total order.

mod address;
mod amount;
mod clock;
mod operation_kind;
mod pair_key;
mod rate;
mod rounding;

pub use address::Address;
pub use amount::{Amount, ONE};
pub use clock::BlockClock;
pub use operation_kind::OperationKind;
pub use pair_key::PairKey;
pub use rate::{Rate, FEE_MAGNIFIER};
pub use rounding::Rounding;
