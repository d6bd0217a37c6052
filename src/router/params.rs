//! Argument bundles for router operations.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, Amount};

/// Supplying liquidity to the `(asset_a, asset_b)` pool.
///
/// For native variants `asset_b` is the wrapped asset and
/// `amount_b_desired` is the native value sent along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidity {
    /// First asset.
    pub asset_a: Address,
    /// Second asset.
    pub asset_b: Address,
    /// Most of A the caller is willing to supply.
    pub amount_a_desired: Amount,
    /// Most of B the caller is willing to supply.
    pub amount_b_desired: Amount,
    /// Least of A the caller accepts to supply.
    pub amount_a_min: Amount,
    /// Least of B the caller accepts to supply.
    pub amount_b_min: Amount,
    /// Recipient of the LP shares.
    pub to: Address,
    /// Latest acceptable timestamp.
    pub deadline: u64,
}

/// Redeeming LP shares of the `(asset_a, asset_b)` pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidity {
    /// First asset.
    pub asset_a: Address,
    /// Second asset.
    pub asset_b: Address,
    /// Shares to redeem.
    pub shares: Amount,
    /// Least of A the caller accepts.
    pub amount_a_min: Amount,
    /// Least of B the caller accepts.
    pub amount_b_min: Amount,
    /// Recipient of both assets.
    pub to: Address,
    /// Latest acceptable timestamp.
    pub deadline: u64,
}

/// Swapping a fixed input along `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactIn {
    /// Input amount taken from the payer.
    pub amount_in: Amount,
    /// Least output the recipient must receive.
    pub amount_out_min: Amount,
    /// Assets visited, first is paid in, last is paid out.
    pub path: Vec<Address>,
    /// Recipient of the output.
    pub to: Address,
    /// Latest acceptable timestamp.
    pub deadline: u64,
}

/// Swapping for a fixed output along `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapExactOut {
    /// Output the recipient must receive.
    pub amount_out: Amount,
    /// Most input the payer is willing to spend.
    pub amount_in_max: Amount,
    /// Assets visited, first is paid in, last is paid out.
    pub path: Vec<Address>,
    /// Recipient of the output.
    pub to: Address,
    /// Latest acceptable timestamp.
    pub deadline: u64,
}
