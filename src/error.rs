//! Unified error types for the exchange engine.
//!
//! Every fallible operation in the crate returns [`DexError`].  Each
//! variant carries the parameters a caller needs to decide whether a retry
//! with different inputs makes sense, and [`DexError::kind`] classifies the
//! failure into a coarse [`ErrorKind`].

use thiserror::Error;

use crate::domain::{Address, Amount};

/// Coarse classification of a [`DexError`].
///
/// No kind is ever retried internally; the classification only tells the
/// caller what sort of adjustment (if any) could make a retry succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed arguments: identical assets, bad path, expired deadline, bounds.
    InputValidation,
    /// A guard on pool or registry state rejected the operation.
    StateGuard,
    /// Not enough balance, allowance or withdrawable amount.
    BalanceOrAllowance,
    /// The caller lacks the required role.
    Authorization,
    /// Magnitudes overflowed or rounded to nothing.
    Arithmetic,
    /// The operation re-entered a guarded resource.
    Reentrancy,
}

/// All failures produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DexError {
    // -- input validation ----------------------------------------------------
    /// Both sides of a pair are the same asset.
    #[error("identical assets")]
    IdenticalAssets,

    /// An asset or account argument is the null address.
    #[error("zero address")]
    ZeroAsset,

    /// A swap path has fewer than two assets or references a missing pool.
    #[error("invalid path")]
    InvalidPath,

    /// The logical clock passed the caller's deadline.
    #[error("expired: deadline {deadline}, now {now}")]
    Expired {
        /// Caller-supplied deadline.
        deadline: u64,
        /// Current timestamp.
        now: u64,
    },

    /// Optimal amount for asset A fell below the caller's floor.
    #[error("insufficient A amount: {amount} < {minimum}")]
    InsufficientAAmount {
        /// Amount that would have been used.
        amount: Amount,
        /// Caller's minimum.
        minimum: Amount,
    },

    /// Optimal amount for asset B fell below the caller's floor.
    #[error("insufficient B amount: {amount} < {minimum}")]
    InsufficientBAmount {
        /// Amount that would have been used.
        amount: Amount,
        /// Caller's minimum.
        minimum: Amount,
    },

    /// A swap would return less than the caller's minimum.
    #[error("insufficient output amount: {amount} < {minimum}")]
    InsufficientOutputAmount {
        /// Quoted output.
        amount: Amount,
        /// Caller's minimum.
        minimum: Amount,
    },

    /// A swap would require more input than the caller's maximum.
    #[error("excessive input amount: {amount} > {maximum}")]
    ExcessiveInputAmount {
        /// Required input.
        amount: Amount,
        /// Caller's maximum.
        maximum: Amount,
    },

    /// A pool received no input for a swap, or a quote was asked for zero.
    #[error("insufficient input amount")]
    InsufficientInputAmount,

    /// A zero amount was supplied where a positive one is required.
    #[error("zero amount")]
    ZeroAmount,

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// An asset is not part of the pool it was used with.
    #[error("invalid asset: {0}")]
    InvalidAsset(&'static str),

    /// No pool exists for the given identity.
    #[error("unknown pool {0}")]
    UnknownPool(Address),

    /// No farm pool exists at the given index.
    #[error("unknown farm pool {0}")]
    UnknownFarmPool(usize),

    /// The account holds no position in the farm pool.
    #[error("no position for {user} in farm pool {pid}")]
    NoFarmPosition {
        /// Farm pool index.
        pid: usize,
        /// Account without a position.
        user: Address,
    },

    /// The asset is not enlisted for pool creation or farming.
    #[error("asset {0} is not enlisted")]
    AssetNotEnlisted(Address),

    /// A reward-rate change exceeds the configured step.
    #[error("invalid reward per block: {current} -> {requested}")]
    InvalidRewardRate {
        /// Current emission rate.
        current: Amount,
        /// Requested emission rate.
        requested: Amount,
    },

    /// The referrer was already corrected once, or is the user itself.
    #[error("invalid referrer")]
    InvalidReferrer,

    // -- state guards --------------------------------------------------------
    /// A pool for this pair already exists.
    #[error("pair exists")]
    PairExists,

    /// A swap moved the reserve ratio further than the configured limit.
    #[error("Excessive deviation from previous price: {deviation} ppm > {limit} ppm")]
    ExcessiveDeviationFromPreviousPrice {
        /// Observed deviation in parts per million.
        deviation: u128,
        /// Configured limit in parts per million.
        limit: u32,
    },

    /// A mint or burn changed total shares by more than the configured limit.
    #[error("Excessive deviation from previous liquidity: {deviation} ppm > {limit} ppm")]
    ExcessiveLiquidityDeviation {
        /// Observed deviation in parts per million.
        deviation: u128,
        /// Configured limit in parts per million.
        limit: u32,
    },

    /// Reserves cannot satisfy the request.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The post-swap balances would decrease the fee-adjusted product.
    #[error("constant product invariant violated")]
    InvariantViolation,

    // -- balance / allowance -------------------------------------------------
    /// The sender holds less than the gross transfer amount.
    #[error("transfer amount exceeds balance: {requested} > {available}")]
    TransferExceedsBalance {
        /// Sender's balance.
        available: Amount,
        /// Gross amount requested.
        requested: Amount,
    },

    /// The spender's allowance is smaller than the transfer.
    #[error("transfer amount exceeds allowance: {requested} > {allowance}")]
    TransferExceedsAllowance {
        /// Remaining allowance.
        allowance: Amount,
        /// Amount requested.
        requested: Amount,
    },

    /// A plain transfer reached the whale cap.
    #[error("exceed max transfer amount: {amount} >= {max}")]
    ExceedsMaxTransferAmount {
        /// Cumulative amount sent in this call.
        amount: Amount,
        /// Current cap.
        max: Amount,
    },

    /// A vest withdrawal asked for more than has unlocked.
    #[error("requested amount exceeds the withdrawable amount: {requested} > {withdrawable}")]
    ExceedsWithdrawableAmount {
        /// Amount requested.
        requested: Amount,
        /// Amount currently unlocked and not withdrawn.
        withdrawable: Amount,
    },

    /// A withdrawal exceeds the deposited principal.
    #[error("insufficient balance: {requested} > {available}")]
    InsufficientBalance {
        /// Principal on deposit.
        available: Amount,
        /// Amount requested.
        requested: Amount,
    },

    // -- authorization -------------------------------------------------------
    /// The caller does not hold the required role.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    // -- arithmetic ----------------------------------------------------------
    /// An intermediate or stored value exceeded its supported width.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// A mint would create zero shares.
    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    /// A burn would return zero of either asset.
    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    // -- reentrancy ----------------------------------------------------------
    /// A guarded resource was entered while already locked.
    #[error("reentrancy on {0}")]
    Reentrancy(&'static str),
}

impl DexError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IdenticalAssets
            | Self::ZeroAsset
            | Self::InvalidPath
            | Self::Expired { .. }
            | Self::InsufficientAAmount { .. }
            | Self::InsufficientBAmount { .. }
            | Self::InsufficientOutputAmount { .. }
            | Self::ExcessiveInputAmount { .. }
            | Self::InsufficientInputAmount
            | Self::ZeroAmount
            | Self::InvalidConfiguration(_)
            | Self::InvalidAsset(_)
            | Self::UnknownPool(_)
            | Self::UnknownFarmPool(_)
            | Self::NoFarmPosition { .. }
            | Self::AssetNotEnlisted(_)
            | Self::InvalidRewardRate { .. }
            | Self::InvalidReferrer => ErrorKind::InputValidation,

            Self::PairExists
            | Self::ExcessiveDeviationFromPreviousPrice { .. }
            | Self::ExcessiveLiquidityDeviation { .. }
            | Self::InsufficientLiquidity
            | Self::InvariantViolation => ErrorKind::StateGuard,

            Self::TransferExceedsBalance { .. }
            | Self::TransferExceedsAllowance { .. }
            | Self::ExceedsMaxTransferAmount { .. }
            | Self::ExceedsWithdrawableAmount { .. }
            | Self::InsufficientBalance { .. } => ErrorKind::BalanceOrAllowance,

            Self::Forbidden(_) => ErrorKind::Authorization,

            Self::ArithmeticOverflow(_)
            | Self::DivisionByZero
            | Self::InsufficientLiquidityMinted
            | Self::InsufficientLiquidityBurned => ErrorKind::Arithmetic,

            Self::Reentrancy(_) => ErrorKind::Reentrancy,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = DexError> = core::result::Result<T, E>;
