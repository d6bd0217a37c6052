//! Farm reward accounting.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`SubPool`] | bulk plus reward-per-share accumulator |
//! | [`Branch`] | one cell of the [`CollectOption`] matrix, split into [`SubPoolKind`]s |
//! | [`FarmPool`] | four branches sharing one emission weight |
//! | [`VestQueue`] | linear-unlock reward grants |
//! | [`ReferralBook`] | referrer links and commissions |
//! | [`FarmAccountant`] | all farm pools and user positions |
//! | [`RepayAccountant`] | single-pool compensation rewards |
//!
//! Accountants never move balances.  They return the amounts the
//! [`Exchange`](crate::engine::Exchange) then mints, burns or transfers.

mod accountant;
mod accrual;
mod branch;
mod farm_pool;
mod referral;
mod repay;
mod user;
mod vesting;

pub use accountant::{DepositReceipt, FarmAccountant, STAKING_POOL_ALLOC};
pub use accrual::{emission, SubPool, ACC_PRECISION};
pub use branch::{Branch, CollectOption, SubPoolKind};
pub use farm_pool::FarmPool;
pub use referral::ReferralBook;
pub use repay::{RepayAccountant, RepayPosition};
pub use user::UserInfo;
pub use vesting::{VestEntry, VestQueue};
