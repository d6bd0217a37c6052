//! # Crosswise DEX
//!
//! Exchange engine combining constant-product pair pools, a fee-routing
//! reward token and multi-branch farm accounting, all driven through one
//! [`Exchange`](engine::Exchange) façade.
//!
//! Every mutating entry point runs atomically: the components it may
//! touch are snapshotted before the call and restored if it fails.
//!
//! # Quick Start
//!
//! ```rust
//! use crosswise_dex::prelude::*;
//! use crosswise_dex::registry::AssetStatus;
//! use crosswise_dex::router::AddLiquidity;
//!
//! let owner = Address::from_label("owner");
//! let usdt = Address::from_label("usdt");
//!
//! let mut config = ExchangeConfig::new(owner);
//! config.fee_router.initial_supply = Amount::new(1_000_000 * ONE);
//! let mut exchange = Exchange::from_config(&config).expect("valid config");
//!
//! exchange.set_asset_status(&owner, usdt, AssetStatus::Enlisted).expect("owner");
//! exchange.mint_asset(&owner, usdt, &owner, Amount::new(1_000 * ONE)).expect("owner");
//!
//! let token = exchange.token().address();
//! let added = exchange
//!     .add_liquidity(
//!         &owner,
//!         &AddLiquidity {
//!             asset_a: token,
//!             asset_b: usdt,
//!             amount_a_desired: Amount::new(500 * ONE),
//!             amount_b_desired: Amount::new(500 * ONE),
//!             amount_a_min: Amount::ZERO,
//!             amount_b_min: Amount::ZERO,
//!             to: owner,
//!             deadline: u64::MAX,
//!         },
//!     )
//!     .expect("liquidity added");
//! assert!(added.shares > Amount::ZERO);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Exchange    │  atomic entry points, payouts, auto-liquify
//! └──────┬───────┘
//!        │ Bank (AssetMover)
//!        ▼
//! ┌──────────────┐   ┌──────────────┐
//! │ Router        │──▶│ PoolRegistry  │──▶ Pool
//! └──────────────┘   └──────────────┘
//! ┌──────────────┐   ┌──────────────┐
//! │ FeeRouter     │   │ Ledger        │  balances of every asset
//! └──────────────┘   └──────────────┘
//! ┌──────────────┐   ┌──────────────┐
//! │ FarmAccountant│   │RepayAccountant│  reward books, no balances
//! └──────────────┘   └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Address`](domain::Address), [`Rate`](domain::Rate), [`OperationKind`](domain::OperationKind) |
//! | [`math`] | Checked arithmetic, 256-bit `mul_div`, reserve quotes |
//! | [`config`] | Validated, serde-ready configuration |
//! | [`traits`] | [`FromConfig`](traits::FromConfig) and the [`AssetMover`](traits::AssetMover) seam |
//! | [`ledger`] | Multi-asset balances, native wrapping, reentrancy guard |
//! | [`pools`] | Constant-product [`Pool`](pools::Pool) with deviation guards |
//! | [`registry`] | Pool creation, asset listing, protocol fee recipient |
//! | [`router`] | Path quoting, liquidity and swap routing |
//! | [`token`] | [`FeeRouter`](token::FeeRouter): fee table, stores, transfer cap |
//! | [`farm`] | Farm and repay reward accounting |
//! | [`engine`] | [`Exchange`](engine::Exchange) façade |
//! | [`error`] | [`DexError`](error::DexError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod farm;
pub mod ledger;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod registry;
pub mod router;
pub mod token;
pub mod traits;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;
