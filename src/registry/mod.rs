//! Pool creation, indexing and asset listing.
//!
//! The [`PoolRegistry`] owns every [`Pool`], indexes them by [`PairKey`]
//! and derives each pool's address from `(registry_id, asset0, asset1)`,
//! so a pool's identity can be computed without a lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PoolConfig;
use crate::domain::{Address, PairKey};
use crate::error::DexError;
use crate::pools::Pool;

/// Listing status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AssetStatus {
    /// Never reviewed.
    #[default]
    None,
    /// Reviewed but not yet admitted.
    Cleared,
    /// Admitted to new pools and farm deposits.
    Enlisted,
    /// Removed from new pools and farm deposits.
    Delisted,
}

/// Creates and indexes pools.
///
/// # Example
///
/// ```rust
/// use crosswise_dex::config::PoolConfig;
/// use crosswise_dex::domain::Address;
/// use crosswise_dex::registry::{AssetStatus, PoolRegistry};
///
/// let owner = Address::from_label("owner");
/// let (a, b) = (Address::from_label("a"), Address::from_label("b"));
/// let mut registry = PoolRegistry::new([7u8; 32], owner, PoolConfig::default());
/// registry.set_asset_status(&owner, a, AssetStatus::Enlisted).expect("owner");
/// registry.set_asset_status(&owner, b, AssetStatus::Enlisted).expect("owner");
///
/// let pool = registry.create_pool(a, b).expect("new pair");
/// assert_eq!(registry.get_pool(b, a), Some(pool));
/// assert_eq!(registry.pool_address(a, b).expect("valid pair"), pool);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRegistry {
    id: [u8; 32],
    owner: Address,
    pools: BTreeMap<Address, Pool>,
    index: BTreeMap<PairKey, Address>,
    order: Vec<Address>,
    statuses: BTreeMap<Address, AssetStatus>,
    fee_to: Option<Address>,
    fee_to_setter: Address,
    pool_config: PoolConfig,
}

impl PoolRegistry {
    /// Creates an empty registry; `owner` is also the initial fee-to setter.
    #[must_use]
    pub fn new(id: [u8; 32], owner: Address, pool_config: PoolConfig) -> Self {
        Self {
            id,
            owner,
            pools: BTreeMap::new(),
            index: BTreeMap::new(),
            order: Vec::new(),
            statuses: BTreeMap::new(),
            fee_to: None,
            fee_to_setter: owner,
            pool_config,
        }
    }

    /// Deterministic address of the pool for `(a, b)`, created or not.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::IdenticalAssets`] or [`DexError::ZeroAsset`] for
    /// an invalid pair.
    pub fn pool_address(&self, a: Address, b: Address) -> Result<Address, DexError> {
        let key = PairKey::new(a, b)?;
        Ok(self.address_for(&key))
    }

    fn address_for(&self, key: &PairKey) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.id);
        hasher.update(&key.asset0().as_bytes());
        hasher.update(&key.asset1().as_bytes());
        Address::from_bytes(*hasher.finalize().as_bytes())
    }

    /// Creates the pool for `(a, b)` and enlists its LP asset.
    ///
    /// # Errors
    ///
    /// - [`DexError::IdenticalAssets`] if `a == b`.
    /// - [`DexError::ZeroAsset`] if either asset is null.
    /// - [`DexError::PairExists`] if the pair already has a pool.
    /// - [`DexError::AssetNotEnlisted`] if either asset is not enlisted.
    pub fn create_pool(&mut self, a: Address, b: Address) -> Result<Address, DexError> {
        let key = PairKey::new(a, b)?;
        if self.index.contains_key(&key) {
            return Err(DexError::PairExists);
        }
        for asset in [key.asset0(), key.asset1()] {
            if !self.is_enlisted(&asset) {
                return Err(DexError::AssetNotEnlisted(asset));
            }
        }
        let address = self.address_for(&key);
        self.pools
            .insert(address, Pool::new(address, key, &self.pool_config));
        self.index.insert(key, address);
        self.order.push(address);
        self.statuses.insert(address, AssetStatus::Enlisted);
        info!(pool = %address, asset0 = %key.asset0(), asset1 = %key.asset1(), count = self.order.len(), "pool created");
        Ok(address)
    }

    /// Order-independent lookup.
    #[must_use]
    pub fn get_pool(&self, a: Address, b: Address) -> Option<Address> {
        let key = PairKey::new(a, b).ok()?;
        self.index.get(&key).copied()
    }

    /// The pool at `address`.
    #[must_use]
    pub fn pool(&self, address: &Address) -> Option<&Pool> {
        self.pools.get(address)
    }

    /// Mutable access to the pool at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownPool`] if no pool lives there.
    pub fn pool_mut(&mut self, address: &Address) -> Result<&mut Pool, DexError> {
        self.pools
            .get_mut(address)
            .ok_or(DexError::UnknownPool(*address))
    }

    /// Returns `true` if `address` is a pool.
    #[must_use]
    pub fn is_pool(&self, address: &Address) -> bool {
        self.pools.contains_key(address)
    }

    /// Pool addresses in creation order.
    #[must_use]
    pub fn all_pools(&self) -> &[Address] {
        &self.order
    }

    /// Number of pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.order.len()
    }

    // -- listing ------------------------------------------------------------

    /// Listing status of `asset`.
    #[must_use]
    pub fn asset_status(&self, asset: &Address) -> AssetStatus {
        self.statuses.get(asset).copied().unwrap_or_default()
    }

    /// Returns `true` if `asset` is enlisted.
    #[must_use]
    pub fn is_enlisted(&self, asset: &Address) -> bool {
        self.asset_status(asset) == AssetStatus::Enlisted
    }

    /// Changes the listing status of `asset`.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::ZeroAsset`] if `asset` is null.
    pub fn set_asset_status(
        &mut self,
        caller: &Address,
        asset: Address,
        status: AssetStatus,
    ) -> Result<(), DexError> {
        self.only_owner(caller)?;
        if asset.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        self.statuses.insert(asset, status);
        info!(asset = %asset, ?status, "asset status changed");
        Ok(())
    }

    // -- protocol fee -------------------------------------------------------

    /// Recipient of protocol-fee shares, if enabled.
    #[must_use]
    pub const fn fee_to(&self) -> Option<Address> {
        self.fee_to
    }

    /// Account allowed to change `fee_to`.
    #[must_use]
    pub const fn fee_to_setter(&self) -> Address {
        self.fee_to_setter
    }

    /// Enables, retargets or disables the protocol fee.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Forbidden`] unless `caller` is the fee-to setter.
    pub fn set_fee_to(&mut self, caller: &Address, fee_to: Option<Address>) -> Result<(), DexError> {
        if *caller != self.fee_to_setter {
            return Err(DexError::Forbidden("fee-to setter"));
        }
        self.fee_to = fee_to;
        Ok(())
    }

    /// Hands the fee-to setter role to `setter`.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Forbidden`] unless `caller` is the fee-to setter.
    pub fn set_fee_to_setter(&mut self, caller: &Address, setter: Address) -> Result<(), DexError> {
        if *caller != self.fee_to_setter {
            return Err(DexError::Forbidden("fee-to setter"));
        }
        self.fee_to_setter = setter;
        Ok(())
    }

    // -- pool parameters ----------------------------------------------------

    /// Parameters applied to new pools.
    #[must_use]
    pub const fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }

    /// Replaces pool parameters for new and existing pools.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::InvalidConfiguration`] if `config` is invalid.
    pub fn set_pool_config(&mut self, caller: &Address, config: PoolConfig) -> Result<(), DexError> {
        self.only_owner(caller)?;
        config.validate()?;
        for pool in self.pools.values_mut() {
            pool.configure(&config)?;
        }
        self.pool_config = config;
        info!(?config, "pool parameters updated");
        Ok(())
    }

    /// Sets both deviation limits, in ppm, on every pool.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::InvalidConfiguration`] if a limit exceeds 1e6.
    pub fn set_deviation_limits(
        &mut self,
        caller: &Address,
        price_change_limit: Option<u32>,
        liquidity_change_limit: Option<u32>,
    ) -> Result<(), DexError> {
        let config = PoolConfig {
            price_change_limit,
            liquidity_change_limit,
            ..self.pool_config
        };
        self.set_pool_config(caller, config)
    }

    fn only_owner(&self, caller: &Address) -> Result<(), DexError> {
        if *caller != self.owner {
            return Err(DexError::Forbidden("registry owner"));
        }
        Ok(())
    }
}
