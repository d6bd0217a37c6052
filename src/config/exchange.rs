//! Top-level engine configuration.

use serde::{Deserialize, Serialize};

use super::{FarmConfig, FeeRouterConfig, PoolConfig, RepayConfig};
use crate::domain::Address;
use crate::error::DexError;

/// Well-known accounts of the engine's own components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accounts {
    /// The fee token; also holds the liquidity bucket.
    pub token: Address,
    /// The router; the only caller trusted with pool kinds.
    pub router: Address,
    /// The farm; custodian of deposits and minted rewards.
    pub farm: Address,
    /// The repay accountant; custodian of compensation funds.
    pub repay: Address,
    /// Native coin.
    pub native: Address,
    /// Wrapped native coin.
    pub wrapped: Address,
}

impl Accounts {
    /// Rejects null or duplicated accounts.
    ///
    /// # Errors
    ///
    /// - [`DexError::ZeroAsset`] if any account is null.
    /// - [`DexError::InvalidConfiguration`] if two accounts coincide.
    pub fn validate(&self) -> Result<(), DexError> {
        let all = self.all();
        if all.iter().any(Address::is_zero) {
            return Err(DexError::ZeroAsset);
        }
        for (i, a) in all.iter().enumerate() {
            if all[i + 1..].contains(a) {
                return Err(DexError::InvalidConfiguration("duplicate component account"));
            }
        }
        Ok(())
    }

    /// Every component account.
    #[must_use]
    pub const fn all(&self) -> [Address; 6] {
        [
            self.token,
            self.router,
            self.farm,
            self.repay,
            self.native,
            self.wrapped,
        ]
    }
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            token: Address::from_label("crss"),
            router: Address::from_label("router"),
            farm: Address::from_label("farm"),
            repay: Address::from_label("repay"),
            native: Address::from_label("native"),
            wrapped: Address::from_label("wbnb"),
        }
    }
}

/// Complete configuration of an [`Exchange`](crate::engine::Exchange).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Seed mixed into every pool address.
    pub registry_id: [u8; 32],
    /// Owner of every administrative surface.
    pub owner: Address,
    /// Account allowed to correct referrers and trigger auto-compounding.
    pub backend_caller: Option<Address>,
    /// Component accounts.
    pub accounts: Accounts,
    /// New-pool parameters.
    pub pool: PoolConfig,
    /// Fee-token parameters.
    pub fee_router: FeeRouterConfig,
    /// Farm parameters.
    pub farm: FarmConfig,
    /// Repay parameters.
    pub repay: RepayConfig,
}

impl ExchangeConfig {
    /// Creates a configuration with production defaults for `owner`.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            registry_id: *blake3::hash(b"crosswise-registry").as_bytes(),
            owner,
            backend_caller: None,
            accounts: Accounts::default(),
            pool: PoolConfig::default(),
            fee_router: FeeRouterConfig::default(),
            farm: FarmConfig::default(),
            repay: RepayConfig::default(),
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first section error encountered.
    pub fn validate(&self) -> Result<(), DexError> {
        if self.owner.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        self.accounts.validate()?;
        self.pool.validate()?;
        self.fee_router.validate()?;
        self.farm.validate()?;
        self.repay.validate()
    }
}
