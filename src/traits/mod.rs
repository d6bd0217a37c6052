//! Core trait abstractions.
//!
//! - [`FromConfig`] for validated, configuration-driven construction
//! - [`AssetMover`] for every balance-affecting side effect

mod asset_mover;
mod from_config;

pub use asset_mover::AssetMover;
pub use from_config::FromConfig;
