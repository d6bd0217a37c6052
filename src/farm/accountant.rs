//! Farm reward accounting across pools, users and collect options.
//!
//! The accountant only keeps books.  Every operation returns the amounts
//! the caller must move (payouts, deposit fees, minted emission), after
//! the books are already committed.

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::branch::{Branch, CollectOption};
use super::farm_pool::FarmPool;
use super::referral::ReferralBook;
use super::user::UserInfo;
use crate::config::{ExchangeConfig, FarmConfig};
use crate::domain::{Address, Amount, Rate, Rounding};
use crate::error::DexError;
use crate::ledger::ReentrancyGuard;
use crate::math::CheckedArithmetic;
use crate::traits::FromConfig;

/// Allocation weight of the staking pool created at construction.
pub const STAKING_POOL_ALLOC: u64 = 1_000;

/// Result of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Principal credited to the user.
    pub credited: Amount,
    /// Deposit fee retained from the deposit.
    pub fee: Amount,
}

/// Books of every farm pool and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmAccountant {
    owner: Address,
    backend: Option<Address>,
    config: FarmConfig,
    pools: Vec<FarmPool>,
    users: BTreeMap<(usize, Address), UserInfo>,
    total_alloc: u64,
    emitted: Amount,
    unminted: Amount,
    referrals: ReferralBook,
    guard: ReentrancyGuard,
}

impl FromConfig<ExchangeConfig> for FarmAccountant {
    fn from_config(config: &ExchangeConfig) -> Result<Self, DexError> {
        config.farm.validate()?;
        let staking = FarmPool::new(
            config.accounts.token,
            STAKING_POOL_ALLOC,
            Rate::ZERO,
            config.farm.start_block,
        );
        Ok(Self {
            owner: config.owner,
            backend: config.backend_caller,
            config: config.farm,
            pools: vec![staking],
            users: BTreeMap::new(),
            total_alloc: STAKING_POOL_ALLOC,
            emitted: Amount::ZERO,
            unminted: Amount::ZERO,
            referrals: ReferralBook::default(),
            guard: ReentrancyGuard::new("farm"),
        })
    }
}

// -- settlement helpers -----------------------------------------------------

/// Reward owed to `info` by `branch` beyond its debts.
fn owed(branch: &Branch, info: &UserInfo) -> Result<Amount, DexError> {
    let principal = branch.principal().pending(info.amount, info.reward_debt)?;
    let staged = match branch.pre_comp() {
        Some(pre_comp) => pre_comp.pending(info.staged, info.staged_debt)?,
        None => Amount::ZERO,
    };
    principal.safe_add(&staged)
}

fn settle(pool: &mut FarmPool, info: &mut UserInfo, block: u64) -> Result<Amount, DexError> {
    let branch = pool.branch_mut(info.option);
    let pending = owed(branch, info)?;
    if pending.is_zero() {
        return Ok(pending);
    }
    match info.option {
        CollectOption::OffOff => {
            info.accumulated = info.accumulated.safe_add(&pending)?;
        }
        CollectOption::OnOff => {
            info.staged = info.staged.safe_add(&pending)?;
            branch.shift_staged(pending, Amount::ZERO)?;
        }
        CollectOption::OffOn => {
            info.vest.push(pending, block);
            branch.record_vested(pending)?;
        }
        CollectOption::OnOn => {
            let staged = pending.safe_div(&Amount::new(2), Rounding::Down)?;
            let vested = pending.safe_sub(&staged)?;
            info.staged = info.staged.safe_add(&staged)?;
            branch.shift_staged(staged, Amount::ZERO)?;
            info.vest.push(vested, block);
            branch.record_vested(vested)?;
        }
    }
    rebase(pool, info)?;
    Ok(pending)
}

fn rebase(pool: &FarmPool, info: &mut UserInfo) -> Result<(), DexError> {
    let branch = pool.branch(info.option);
    info.reward_debt = branch.principal().accrued(info.amount)?;
    info.staged_debt = match branch.pre_comp() {
        Some(pre_comp) => pre_comp.accrued(info.staged)?,
        None => Amount::ZERO,
    };
    Ok(())
}

impl FarmAccountant {
    // -- reads --------------------------------------------------------------

    /// Farm parameters.
    #[must_use]
    pub const fn config(&self) -> &FarmConfig {
        &self.config
    }

    /// Current emission per block.
    #[must_use]
    pub const fn reward_per_block(&self) -> Amount {
        self.config.reward_per_block
    }

    /// Farm pools by id.
    #[must_use]
    pub fn pools(&self) -> &[FarmPool] {
        &self.pools
    }

    /// Farm pool `pid`.
    #[must_use]
    pub fn pool(&self, pid: usize) -> Option<&FarmPool> {
        self.pools.get(pid)
    }

    /// Number of farm pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Sum of allocation points.
    #[must_use]
    pub const fn total_alloc_point(&self) -> u64 {
        self.total_alloc
    }

    /// Reward distributed so far.
    #[must_use]
    pub const fn emitted(&self) -> Amount {
        self.emitted
    }

    /// Backend caller, if any.
    #[must_use]
    pub const fn backend_caller(&self) -> Option<Address> {
        self.backend
    }

    /// Referral links and commissions.
    #[must_use]
    pub const fn referrals(&self) -> &ReferralBook {
        &self.referrals
    }

    /// `user`'s position in `pid`.
    #[must_use]
    pub fn user_info(&self, pid: usize, user: &Address) -> Option<&UserInfo> {
        self.users.get(&(pid, *user))
    }

    /// Pools where `user` holds anything.
    #[must_use]
    pub fn user_pools(&self, user: &Address) -> Vec<usize> {
        self.users
            .iter()
            .filter(|((_, who), info)| who == user && !info.is_empty())
            .map(|((pid, _), _)| *pid)
            .collect()
    }

    /// Id of the pool accepting `asset`.
    #[must_use]
    pub fn pool_id(&self, asset: &Address) -> Option<usize> {
        self.pools.iter().position(|p| p.asset() == *asset)
    }

    fn capped_due(&self, pool: &FarmPool, block: u64) -> Result<Amount, DexError> {
        let due = pool.due(block, self.config.reward_per_block, self.total_alloc)?;
        Ok(match self.config.emission_budget {
            Some(budget) => due.min(budget.saturating_sub(&self.emitted)),
            None => due,
        })
    }

    /// Reward `user` would settle in `pid` at `block`.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn pending_reward(&self, pid: usize, user: &Address, block: u64) -> Result<Amount, DexError> {
        let pool = self.pools.get(pid).ok_or(DexError::UnknownFarmPool(pid))?;
        let Some(info) = self.users.get(&(pid, *user)) else {
            return Ok(Amount::ZERO);
        };
        let next = pool.preview(block, self.capped_due(pool, block)?)?;
        owed(next.branch(info.option), info)
    }

    /// Vested reward `user` can withdraw from `pid` at `block`.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn withdrawable_vest(&self, pid: usize, user: &Address, block: u64) -> Result<Amount, DexError> {
        if pid >= self.pools.len() {
            return Err(DexError::UnknownFarmPool(pid));
        }
        self.users
            .get(&(pid, *user))
            .map_or(Ok(Amount::ZERO), |info| {
                info.vest.withdrawable(block, self.config.vest_window_blocks)
            })
    }

    // -- guard --------------------------------------------------------------

    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, DexError>) -> Result<T, DexError> {
        ReentrancyGuard::run(self, |s| &mut s.guard, f)
    }

    /// Holds the farm lock across a payout; every farm operation fails
    /// with [`DexError::Reentrancy`] until [`FarmAccountant::end_payout`].
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Reentrancy`] if already held.
    pub fn begin_payout(&mut self) -> Result<(), DexError> {
        self.guard.enter()
    }

    /// Releases the payout lock.
    pub fn end_payout(&mut self) {
        self.guard.exit();
    }

    /// Position of `user` in `pid`, opened empty on first use.
    fn open_position(&mut self, pid: usize, user: &Address) -> Result<(&mut FarmPool, &mut UserInfo), DexError> {
        let pool = self.pools.get_mut(pid).ok_or(DexError::UnknownFarmPool(pid))?;
        let info = self.users.entry((pid, *user)).or_default();
        Ok((pool, info))
    }

    /// Existing position of `user` in `pid`.
    fn position(&mut self, pid: usize, user: &Address) -> Result<(&mut FarmPool, &mut UserInfo), DexError> {
        let pool = self.pools.get_mut(pid).ok_or(DexError::UnknownFarmPool(pid))?;
        let info = self
            .users
            .get_mut(&(pid, *user))
            .ok_or(DexError::NoFarmPosition { pid, user: *user })?;
        Ok((pool, info))
    }

    // -- emission -----------------------------------------------------------

    /// Distributes reward due in `pid` up to `block`.  Idempotent per block.
    ///
    /// Returns the amount distributed, which the caller must mint.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn update_pool(&mut self, pid: usize, block: u64) -> Result<Amount, DexError> {
        let pool = self.pools.get(pid).ok_or(DexError::UnknownFarmPool(pid))?;
        let due = self.capped_due(pool, block)?;
        let spread = self.pools[pid].distribute(block, due)?;
        self.emitted = self.emitted.safe_add(&spread)?;
        self.unminted = self.unminted.safe_add(&spread)?;
        Ok(spread)
    }

    /// Updates every pool.
    ///
    /// # Errors
    ///
    /// Returns the first pool error.
    pub fn mass_update_pools(&mut self, block: u64) -> Result<Amount, DexError> {
        (0..self.pools.len()).try_fold(Amount::ZERO, |sum, pid| {
            sum.safe_add(&self.update_pool(pid, block)?)
        })
    }

    /// Reward distributed but not yet minted; resets to zero.
    pub fn drain_emission(&mut self) -> Amount {
        core::mem::take(&mut self.unminted)
    }

    // -- administration -----------------------------------------------------

    fn only_owner(&self, caller: &Address) -> Result<(), DexError> {
        if *caller != self.owner {
            return Err(DexError::Forbidden("farm owner"));
        }
        Ok(())
    }

    /// Adds a pool for `asset`.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::ZeroAsset`] for a null asset.
    /// - [`DexError::InvalidConfiguration`] if `asset` already has a pool or
    ///   the fee exceeds 100%.
    pub fn add_pool(
        &mut self,
        caller: &Address,
        asset: Address,
        alloc_point: u64,
        deposit_fee: Rate,
        block: u64,
    ) -> Result<usize, DexError> {
        self.only_owner(caller)?;
        if asset.is_zero() {
            return Err(DexError::ZeroAsset);
        }
        if self.pool_id(&asset).is_some() {
            return Err(DexError::InvalidConfiguration("farm pool exists"));
        }
        deposit_fee.validate()?;
        self.mass_update_pools(block)?;
        let start = block.max(self.config.start_block);
        self.pools
            .push(FarmPool::new(asset, alloc_point, deposit_fee, start));
        self.total_alloc = self
            .total_alloc
            .checked_add(alloc_point)
            .ok_or(DexError::ArithmeticOverflow("total alloc point"))?;
        let pid = self.pools.len() - 1;
        info!(pid, %asset, alloc_point, %deposit_fee, "farm pool added");
        Ok(pid)
    }

    /// Changes a pool's weight and deposit fee.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::InvalidConfiguration`] if the fee exceeds 100%.
    pub fn set_pool(
        &mut self,
        caller: &Address,
        pid: usize,
        alloc_point: u64,
        deposit_fee: Rate,
        block: u64,
    ) -> Result<(), DexError> {
        self.only_owner(caller)?;
        deposit_fee.validate()?;
        let old = self.pools.get(pid).ok_or(DexError::UnknownFarmPool(pid))?.alloc_point();
        self.mass_update_pools(block)?;
        self.total_alloc = self.total_alloc.saturating_sub(old).saturating_add(alloc_point);
        self.pools[pid].set_params(alloc_point, deposit_fee);
        info!(pid, alloc_point, %deposit_fee, "farm pool updated");
        Ok(())
    }

    /// Changes the emission rate, bounded by the configured step.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the owner.
    /// - [`DexError::InvalidRewardRate`] if the change exceeds the step.
    pub fn set_reward_per_block(&mut self, caller: &Address, rate: Amount, block: u64) -> Result<(), DexError> {
        self.only_owner(caller)?;
        let current = self.config.reward_per_block;
        if let Some(step) = self.config.max_reward_rate_change {
            let allowed = step.apply(current)?;
            let change = if rate > current {
                rate.safe_sub(&current)?
            } else {
                current.safe_sub(&rate)?
            };
            if change > allowed {
                warn!(%current, requested = %rate, "reward rate change rejected");
                return Err(DexError::InvalidRewardRate {
                    current,
                    requested: rate,
                });
            }
        }
        self.mass_update_pools(block)?;
        self.config.reward_per_block = rate;
        info!(%current, %rate, "reward per block changed");
        Ok(())
    }

    /// Sets the backend caller.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Forbidden`] unless `caller` is the owner.
    pub fn set_backend_caller(&mut self, caller: &Address, backend: Option<Address>) -> Result<(), DexError> {
        self.only_owner(caller)?;
        self.backend = backend;
        Ok(())
    }

    /// Corrects `user`'s referrer; backend only, once per user.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] unless `caller` is the backend caller.
    /// - [`DexError::InvalidReferrer`] if already corrected.
    pub fn change_referrer(&mut self, caller: &Address, user: &Address, referrer: &Address) -> Result<(), DexError> {
        if self.backend != Some(*caller) {
            return Err(DexError::Forbidden("backend caller"));
        }
        self.referrals.change(user, referrer)
    }

    /// Zeroes and returns `referrer`'s outstanding commission.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn claim_commission(&mut self, referrer: &Address) -> Result<Amount, DexError> {
        self.guarded(|s| s.referrals.claim(referrer))
    }

    fn accrue_commission(&mut self, user: &Address, payout: Amount) -> Result<Amount, DexError> {
        self.referrals
            .accrue(user, payout, self.config.referral_commission_rate)
    }

    // -- positions ----------------------------------------------------------

    /// Records a deposit of `amount` already received by the farm.
    ///
    /// Pending reward is settled first; the deposit fee is deducted from
    /// the credited principal and returned for the caller to route.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::InvalidReferrer`] for a self-referral.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn deposit(
        &mut self,
        pid: usize,
        user: &Address,
        amount: Amount,
        block: u64,
        referrer: Option<Address>,
    ) -> Result<DepositReceipt, DexError> {
        self.guarded(|s| {
            if let Some(referrer) = referrer {
                s.referrals.record(user, &referrer)?;
            }
            s.update_pool(pid, block)?;
            let (pool, info) = s.open_position(pid, user)?;
            settle(pool, info, block)?;
            let fee = pool.deposit_fee().apply(amount)?;
            let credited = amount.safe_sub(&fee)?;
            info.amount = info.amount.safe_add(&credited)?;
            pool.branch_mut(info.option).principal_mut().add_bulk(credited)?;
            rebase(pool, info)?;
            info!(pid, %user, %credited, %fee, "farm deposit");
            Ok(DepositReceipt { credited, fee })
        })
    }

    /// Adds reward-derived principal without a deposit fee.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn credit_principal(&mut self, pid: usize, user: &Address, amount: Amount, block: u64) -> Result<(), DexError> {
        self.guarded(|s| {
            s.update_pool(pid, block)?;
            let (pool, info) = s.open_position(pid, user)?;
            settle(pool, info, block)?;
            info.amount = info.amount.safe_add(&amount)?;
            pool.branch_mut(info.option).principal_mut().add_bulk(amount)?;
            rebase(pool, info)
        })
    }

    /// Removes `amount` of principal; returns it for the caller to pay out.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientBalance`] if more than the principal.
    /// - [`DexError::NoFarmPosition`] if `user` never opened one.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn withdraw(&mut self, pid: usize, user: &Address, amount: Amount, block: u64) -> Result<Amount, DexError> {
        self.guarded(|s| {
            s.update_pool(pid, block)?;
            let (pool, info) = s.position(pid, user)?;
            if amount > info.amount {
                return Err(DexError::InsufficientBalance {
                    available: info.amount,
                    requested: amount,
                });
            }
            settle(pool, info, block)?;
            info.amount = info.amount.safe_sub(&amount)?;
            pool.branch_mut(info.option).principal_mut().remove_bulk(amount)?;
            rebase(pool, info)?;
            info!(pid, %user, %amount, "farm withdraw");
            Ok(amount)
        })
    }

    /// Moves `user`'s position in `pid` to another collect option.
    ///
    /// Pending reward is settled under the old option first.  Staged reward
    /// follows the principal into a compounding option or is released to
    /// `accumulated` otherwise; vest grants are untouched.
    ///
    /// # Errors
    ///
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn switch_collect_option(
        &mut self,
        pid: usize,
        user: &Address,
        option: CollectOption,
        block: u64,
    ) -> Result<(), DexError> {
        self.guarded(|s| {
            s.update_pool(pid, block)?;
            let (pool, info) = s.open_position(pid, user)?;
            let old = info.option;
            if old == option {
                return Ok(());
            }
            settle(pool, info, block)?;
            let (amount, staged) = (info.amount, info.staged);
            {
                let from = pool.branch_mut(old);
                from.principal_mut().remove_bulk(amount)?;
                from.shift_staged(Amount::ZERO, staged)?;
            }
            let to = pool.branch_mut(option);
            to.principal_mut().add_bulk(amount)?;
            if option.is_compounding() {
                to.shift_staged(staged, Amount::ZERO)?;
            } else {
                info.accumulated = info.accumulated.safe_add(&staged)?;
                info.staged = Amount::ZERO;
            }
            info.option = option;
            rebase(pool, info)?;
            info!(pid, %user, from = %old, to = %option, "collect option switched");
            Ok(())
        })
    }

    /// Turns settled `accumulated` into a new vest grant starting at `block`.
    ///
    /// # Errors
    ///
    /// - [`DexError::NoFarmPosition`] if `user` never opened one.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn vest_accumulated(&mut self, pid: usize, user: &Address, block: u64) -> Result<Amount, DexError> {
        self.guarded(|s| {
            s.update_pool(pid, block)?;
            let (pool, info) = s.position(pid, user)?;
            settle(pool, info, block)?;
            let amount = core::mem::take(&mut info.accumulated);
            info.vest.push(amount, block);
            info!(pid, %user, %amount, "accumulated reward vested");
            Ok(amount)
        })
    }

    /// Consumes `amount` of unlocked vest; returns it for payout.
    ///
    /// # Errors
    ///
    /// - [`DexError::ExceedsWithdrawableAmount`] above the unlocked total.
    /// - [`DexError::NoFarmPosition`] if `user` never opened one.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn withdraw_vest(&mut self, pid: usize, user: &Address, amount: Amount, block: u64) -> Result<Amount, DexError> {
        self.guarded(|s| {
            let window = s.config.vest_window_blocks;
            let (_, info) = s.position(pid, user)?;
            info.vest.withdraw(amount, block, window)?;
            s.accrue_commission(user, amount)?;
            info!(pid, %user, %amount, "vest withdrawn");
            Ok(amount)
        })
    }

    /// Settles and takes all of `accumulated` for harvest, compound or stake.
    ///
    /// # Errors
    ///
    /// - [`DexError::NoFarmPosition`] if `user` never opened one.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn take_accumulated(&mut self, pid: usize, user: &Address, block: u64) -> Result<Amount, DexError> {
        self.guarded(|s| {
            s.update_pool(pid, block)?;
            let (pool, info) = s.position(pid, user)?;
            settle(pool, info, block)?;
            let amount = core::mem::take(&mut info.accumulated);
            s.accrue_commission(user, amount)?;
            Ok(amount)
        })
    }

    /// Settles every compounding position in `pid` and takes its staged
    /// reward.  Backend or owner only.
    ///
    /// Returns `(user, staged)` pairs for the caller to compound.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] for any other caller.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    pub fn auto_compound(&mut self, caller: &Address, pid: usize, block: u64) -> Result<Vec<(Address, Amount)>, DexError> {
        if self.backend != Some(*caller) && *caller != self.owner {
            return Err(DexError::Forbidden("backend caller"));
        }
        self.guarded(|s| {
            s.update_pool(pid, block)?;
            let pool = s.pools.get_mut(pid).ok_or(DexError::UnknownFarmPool(pid))?;
            let low = (pid, Address::zero());
            let high = (pid, Address::from_bytes([0xff; 32]));
            let mut staged = Vec::new();
            for ((_, user), info) in s.users.range_mut(low..=high) {
                if !info.option.is_compounding() {
                    continue;
                }
                settle(pool, info, block)?;
                let amount = core::mem::take(&mut info.staged);
                if amount.is_zero() {
                    continue;
                }
                info.staged_debt = Amount::ZERO;
                pool.branch_mut(info.option).shift_staged(Amount::ZERO, amount)?;
                staged.push((*user, amount));
            }
            for (user, amount) in &staged {
                s.accrue_commission(user, *amount)?;
            }
            info!(pid, positions = staged.len(), "auto-compound settled");
            Ok(staged)
        })
    }

    /// Returns all principal, forfeiting every form of reward.
    ///
    /// # Errors
    ///
    /// - [`DexError::ZeroAmount`] if no principal is held.
    /// - [`DexError::NoFarmPosition`] if `user` never opened one.
    /// - [`DexError::UnknownFarmPool`] for a bad `pid`.
    /// - [`DexError::Reentrancy`] during a payout.
    pub fn emergency_withdraw(&mut self, pid: usize, user: &Address) -> Result<Amount, DexError> {
        self.guarded(|s| {
            let (pool, info) = s.position(pid, user)?;
            let amount = info.amount;
            if amount.is_zero() {
                return Err(DexError::ZeroAmount);
            }
            let branch = pool.branch_mut(info.option);
            branch.principal_mut().remove_bulk(amount)?;
            branch.shift_staged(Amount::ZERO, info.staged)?;
            let forfeited = info.vest.clear()?;
            warn!(pid, %user, %amount, accumulated = %info.accumulated, %forfeited, "emergency withdraw");
            *info = UserInfo {
                option: info.option,
                ..UserInfo::default()
            };
            Ok(amount)
        })
    }
}
