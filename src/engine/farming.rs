//! Farm and repay entry points of the [`Exchange`].
//!
//! The accountants commit their books first; only then does the engine
//! mint the emission they report and move tokens.  Payouts leave the farm
//! account while the farm's payout lock is held.
//!
//! | Operation | Payout kind | Burn |
//! |-----------|-------------|------|
//! | harvest | `HarvestAccumulated` / `MassHarvest` | non-vest burn rate |
//! | withdraw vest | `WithdrawVest` | none |
//! | withdraw | `Withdraw` | none |
//! | emergency withdraw | `EmergencyWithdraw` | none |
//! | repay harvest | `HarvestRepay` | none |

use tracing::info;

use super::{Bank, Exchange, Touches};
use crate::domain::{Address, Amount, OperationKind, Rate, Rounding};
use crate::error::DexError;
use crate::farm::{CollectOption, DepositReceipt};
use crate::math::CheckedArithmetic;
use crate::router::{AddLiquidity, SwapExactIn};
use crate::traits::AssetMover;

/// Per-pool outcome of a mass operation.
pub type MassOutcome = Vec<(usize, Result<Amount, DexError>)>;

impl Exchange {
    // -- plumbing -----------------------------------------------------------

    fn farm_account(&self) -> Address {
        self.config.accounts.farm
    }

    fn farm_asset(&self, pid: usize) -> Result<Address, DexError> {
        self.farm
            .pool(pid)
            .map(|p| p.asset())
            .ok_or(DexError::UnknownFarmPool(pid))
    }

    /// Mints whatever the farm distributed but has not minted yet.
    fn mint_emission(&mut self) -> Result<Amount, DexError> {
        let amount = self.farm.drain_emission();
        let farm = self.farm_account();
        self.token.mint(&farm, &farm, amount)?;
        Ok(amount)
    }

    /// Moves `amount` of `asset` out of the farm under the payout lock.
    fn pay_from_farm(
        &mut self,
        asset: &Address,
        to: &Address,
        amount: Amount,
        kind: OperationKind,
    ) -> Result<Amount, DexError> {
        if amount.is_zero() {
            return Ok(amount);
        }
        let farm = self.farm_account();
        self.farm.begin_payout()?;
        let out = Bank::new(&mut self.ledger, &mut self.token, farm).transfer(asset, &farm, to, amount, kind);
        self.farm.end_payout();
        out
    }

    /// Moves `amount` of `asset` out of the farm untaxed, under the payout
    /// lock.  For amounts already charged on the way in.
    fn release_from_farm(&mut self, asset: &Address, to: &Address, amount: Amount) -> Result<(), DexError> {
        if amount.is_zero() {
            return Ok(());
        }
        let farm = self.farm_account();
        self.farm.begin_payout()?;
        let out = Bank::exempt(&mut self.ledger, &mut self.token, farm).transfer(asset, &farm, to, amount, OperationKind::None);
        self.farm.end_payout();
        out.map(|_| ())
    }

    /// Runs `amount` of reward held by the farm through the `kind` fee row
    /// without it leaving the farm; returns what remains.
    fn charge_in_place(&mut self, amount: Amount, kind: OperationKind) -> Result<Amount, DexError> {
        let token = self.token.address();
        let farm = self.farm_account();
        self.pay_from_farm(&token, &farm, amount, kind)
    }

    // -- administration -----------------------------------------------------

    /// Adds a farm pool for an enlisted asset or the fee token.
    ///
    /// # Errors
    ///
    /// - [`DexError::AssetNotEnlisted`] for an unlisted asset.
    /// - Any error of [`FarmAccountant::add_pool`](crate::farm::FarmAccountant::add_pool).
    pub fn add_farm_pool(&mut self, caller: &Address, asset: Address, alloc_point: u64, deposit_fee: Rate) -> Result<usize, DexError> {
        self.atomically("add farm pool", Touches::FARM | Touches::TOKEN, |ex| {
            if asset != ex.token.address() && !ex.registry.is_enlisted(&asset) {
                return Err(DexError::AssetNotEnlisted(asset));
            }
            let block = ex.clock.number();
            let pid = ex.farm.add_pool(caller, asset, alloc_point, deposit_fee, block)?;
            ex.mint_emission()?;
            Ok(pid)
        })
    }

    /// Changes a farm pool's weight and deposit fee.
    ///
    /// # Errors
    ///
    /// Any error of [`FarmAccountant::set_pool`](crate::farm::FarmAccountant::set_pool).
    pub fn set_farm_pool(&mut self, caller: &Address, pid: usize, alloc_point: u64, deposit_fee: Rate) -> Result<(), DexError> {
        self.atomically("set farm pool", Touches::FARM | Touches::TOKEN, |ex| {
            let block = ex.clock.number();
            ex.farm.set_pool(caller, pid, alloc_point, deposit_fee, block)?;
            ex.mint_emission().map(|_| ())
        })
    }

    /// Changes the emission rate.
    ///
    /// # Errors
    ///
    /// Any error of [`FarmAccountant::set_reward_per_block`](crate::farm::FarmAccountant::set_reward_per_block).
    pub fn set_reward_per_block(&mut self, caller: &Address, rate: Amount) -> Result<(), DexError> {
        self.atomically("set reward per block", Touches::FARM | Touches::TOKEN, |ex| {
            let block = ex.clock.number();
            ex.farm.set_reward_per_block(caller, rate, block)?;
            ex.mint_emission().map(|_| ())
        })
    }

    /// Sets the backend caller.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Forbidden`] unless `caller` is the owner.
    pub fn set_backend_caller(&mut self, caller: &Address, backend: Option<Address>) -> Result<(), DexError> {
        self.farm.set_backend_caller(caller, backend)
    }

    /// Brings every farm pool up to the current block and mints the reward.
    ///
    /// # Errors
    ///
    /// Returns the first pool error.
    pub fn mass_update_pools(&mut self) -> Result<Amount, DexError> {
        self.atomically("mass update pools", Touches::FARM | Touches::TOKEN, |ex| {
            ex.farm.mass_update_pools(ex.clock.number())?;
            ex.mint_emission()
        })
    }

    // -- reads --------------------------------------------------------------

    /// Reward `user` would settle in `pid` now.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownFarmPool`] for a bad `pid`.
    pub fn pending_reward(&self, pid: usize, user: &Address) -> Result<Amount, DexError> {
        self.farm.pending_reward(pid, user, self.clock.number())
    }

    /// Vested reward `user` can withdraw from `pid` now.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownFarmPool`] for a bad `pid`.
    pub fn withdrawable_vest(&self, pid: usize, user: &Address) -> Result<Amount, DexError> {
        self.farm.withdrawable_vest(pid, user, self.clock.number())
    }

    // -- principal ----------------------------------------------------------

    /// Deposits `amount` of the pool's asset, settling pending reward first.
    ///
    /// The deposit fee is withheld from the amount received and sent on to
    /// the treasury store without a second charge.
    ///
    /// # Errors
    ///
    /// - [`DexError::AssetNotEnlisted`] once the pool's asset is delisted.
    /// - [`DexError::TransferExceedsBalance`] if `user` holds less.
    /// - [`DexError::InvalidReferrer`] for a self-referral.
    /// - Any error of [`FarmAccountant::deposit`](crate::farm::FarmAccountant::deposit).
    pub fn deposit(&mut self, user: &Address, pid: usize, amount: Amount, referrer: Option<Address>) -> Result<DepositReceipt, DexError> {
        self.atomically("farm deposit", Touches::FARM_PAYOUT, |ex| {
            let asset = ex.farm_asset(pid)?;
            if asset != ex.token.address() && !ex.registry.is_enlisted(&asset) {
                return Err(DexError::AssetNotEnlisted(asset));
            }
            let farm = ex.farm_account();
            let received = if amount.is_zero() {
                amount
            } else {
                Bank::new(&mut ex.ledger, &mut ex.token, farm).transfer(&asset, user, &farm, amount, OperationKind::Deposit)?
            };
            let receipt = ex.farm.deposit(pid, user, received, ex.clock.number(), referrer)?;
            ex.mint_emission()?;
            let treasury = ex.token.stores().treasury;
            ex.release_from_farm(&asset, &treasury, receipt.fee)?;
            Ok(receipt)
        })
    }

    /// Withdraws `amount` of principal.
    ///
    /// # Errors
    ///
    /// Any error of [`FarmAccountant::withdraw`](crate::farm::FarmAccountant::withdraw).
    pub fn withdraw(&mut self, user: &Address, pid: usize, amount: Amount) -> Result<Amount, DexError> {
        self.atomically("farm withdraw", Touches::FARM_PAYOUT, |ex| {
            let asset = ex.farm_asset(pid)?;
            let amount = ex.farm.withdraw(pid, user, amount, ex.clock.number())?;
            ex.mint_emission()?;
            ex.pay_from_farm(&asset, user, amount, OperationKind::Withdraw)
        })
    }

    /// Deposits fee tokens into the staking pool.
    ///
    /// # Errors
    ///
    /// Any error of [`Exchange::deposit`].
    pub fn enter_staking(&mut self, user: &Address, amount: Amount) -> Result<DepositReceipt, DexError> {
        self.deposit(user, 0, amount, None)
    }

    /// Withdraws fee tokens from the staking pool.
    ///
    /// # Errors
    ///
    /// Any error of [`Exchange::withdraw`].
    pub fn leave_staking(&mut self, user: &Address, amount: Amount) -> Result<Amount, DexError> {
        self.withdraw(user, 0, amount)
    }

    /// Returns all principal and forfeits every reward.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ZeroAmount`] without principal.
    pub fn emergency_withdraw(&mut self, user: &Address, pid: usize) -> Result<Amount, DexError> {
        self.atomically("emergency withdraw", Touches::FARM_PAYOUT, |ex| {
            let asset = ex.farm_asset(pid)?;
            let amount = ex.farm.emergency_withdraw(pid, user)?;
            ex.pay_from_farm(&asset, user, amount, OperationKind::EmergencyWithdraw)
        })
    }

    /// Moves `user`'s position to another collect option.
    ///
    /// # Errors
    ///
    /// Any error of [`FarmAccountant::switch_collect_option`](crate::farm::FarmAccountant::switch_collect_option).
    pub fn switch_collect_option(&mut self, user: &Address, pid: usize, option: CollectOption) -> Result<(), DexError> {
        self.atomically("switch collect option", Touches::FARM | Touches::TOKEN, |ex| {
            ex.farm.switch_collect_option(pid, user, option, ex.clock.number())?;
            ex.mint_emission().map(|_| ())
        })
    }

    // -- accumulated reward -------------------------------------------------

    fn harvest_as(&mut self, user: &Address, pid: usize, kind: OperationKind) -> Result<Amount, DexError> {
        self.atomically("harvest", Touches::FARM | Touches::TOKEN, |ex| {
            let reward = ex.farm.take_accumulated(pid, user, ex.clock.number())?;
            ex.mint_emission()?;
            let burned = ex.config.farm.non_vest_burn_rate.apply(reward)?;
            let farm = ex.farm_account();
            ex.token.burn(&farm, &farm, burned)?;
            let token = ex.token.address();
            let paid = ex.pay_from_farm(&token, user, reward.safe_sub(&burned)?, kind)?;
            info!(pid, %user, %reward, %burned, %paid, "reward harvested");
            Ok(paid)
        })
    }

    /// Pays settled reward out, burning the non-vest share.
    ///
    /// Returns the net amount `user` received.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownFarmPool`] for a bad `pid`.
    pub fn harvest(&mut self, user: &Address, pid: usize) -> Result<Amount, DexError> {
        self.harvest_as(user, pid, OperationKind::HarvestAccumulated)
    }

    /// Turns settled reward into a vest grant.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownFarmPool`] for a bad `pid`.
    pub fn vest(&mut self, user: &Address, pid: usize) -> Result<Amount, DexError> {
        self.atomically("vest", Touches::FARM | Touches::TOKEN, |ex| {
            let amount = ex.farm.vest_accumulated(pid, user, ex.clock.number())?;
            ex.mint_emission()?;
            Ok(amount)
        })
    }

    /// Pays out unlocked vest.
    ///
    /// # Errors
    ///
    /// - [`DexError::ExceedsWithdrawableAmount`] above the unlocked total.
    /// - [`DexError::Reentrancy`] from inside another farm payout.
    pub fn withdraw_vest(&mut self, user: &Address, pid: usize, amount: Amount) -> Result<Amount, DexError> {
        self.atomically("withdraw vest", Touches::FARM | Touches::TOKEN, |ex| {
            let amount = ex.farm.withdraw_vest(pid, user, amount, ex.clock.number())?;
            let token = ex.token.address();
            ex.pay_from_farm(&token, user, amount, OperationKind::WithdrawVest)
        })
    }

    /// Compounds `reward` held by the farm into `user`'s principal in `pid`.
    ///
    /// The compound fee goes to the treasury.  Fee-token pools take the
    /// reward directly; LP pools containing the fee token are zapped into
    /// by swapping half and adding liquidity.
    fn compound_into(&mut self, pid: usize, user: &Address, reward: Amount, kind: OperationKind) -> Result<Amount, DexError> {
        if reward.is_zero() {
            return Ok(reward);
        }
        let token = self.token.address();
        let farm = self.farm_account();
        let treasury = self.token.stores().treasury;
        let fee = self.config.farm.compound_fee_rate.apply(reward)?;
        self.pay_from_farm(&token, &treasury, fee, kind)?;
        let rest = reward.safe_sub(&fee)?;
        let asset = self.farm_asset(pid)?;
        let block = self.clock.number();

        let principal = if asset == token {
            self.charge_in_place(rest, kind)?
        } else {
            let pool = self
                .registry
                .pool(&asset)
                .ok_or(DexError::InvalidAsset("farm pool cannot compound reward"))?;
            let key = pool.key();
            let other = key.other(&token)?;
            let half = rest.safe_div(&Amount::new(2), Rounding::Down)?;
            let deadline = self.clock.timestamp();
            let mut bank = Bank::new(&mut self.ledger, &mut self.token, self.router.address());
            let received = self.router.swap_exact_tokens_for_tokens(
                &mut self.registry,
                &mut bank,
                &self.clock,
                &farm,
                &SwapExactIn {
                    amount_in: half,
                    amount_out_min: Amount::ZERO,
                    path: vec![token, other],
                    to: farm,
                    deadline,
                },
            )?;
            let added = self.router.add_liquidity(
                &mut self.registry,
                &mut bank,
                &self.clock,
                &farm,
                &AddLiquidity {
                    asset_a: token,
                    asset_b: other,
                    amount_a_desired: rest.safe_sub(&half)?,
                    amount_b_desired: received,
                    amount_a_min: Amount::ZERO,
                    amount_b_min: Amount::ZERO,
                    to: farm,
                    deadline,
                },
            )?;
            added.shares
        };
        self.farm.credit_principal(pid, user, principal, block)?;
        info!(pid, %user, %reward, %fee, %principal, "reward compounded");
        Ok(principal)
    }

    fn compound_as(&mut self, user: &Address, pid: usize, kind: OperationKind) -> Result<Amount, DexError> {
        self.atomically("compound", Touches::FARM_ZAP, |ex| {
            let reward = ex.farm.take_accumulated(pid, user, ex.clock.number())?;
            ex.mint_emission()?;
            ex.compound_into(pid, user, reward, kind)
        })
    }

    /// Compounds settled reward into principal of the same pool.
    ///
    /// Returns the principal added.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidAsset`] if the pool's asset cannot be zapped into.
    /// - Swap and liquidity errors of the zap.
    pub fn compound(&mut self, user: &Address, pid: usize) -> Result<Amount, DexError> {
        self.compound_as(user, pid, OperationKind::CompoundAccumulated)
    }

    fn stake_as(&mut self, user: &Address, pid: usize, kind: OperationKind) -> Result<Amount, DexError> {
        self.atomically("stake", Touches::FARM | Touches::TOKEN, |ex| {
            let block = ex.clock.number();
            let reward = ex.farm.take_accumulated(pid, user, block)?;
            ex.mint_emission()?;
            let staked = ex.charge_in_place(reward, kind)?;
            ex.farm.credit_principal(0, user, staked, block)?;
            ex.mint_emission()?;
            info!(pid, %user, %reward, %staked, "reward staked");
            Ok(staked)
        })
    }

    /// Stakes settled reward into the staking pool.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::UnknownFarmPool`] for a bad `pid`.
    pub fn stake(&mut self, user: &Address, pid: usize) -> Result<Amount, DexError> {
        self.stake_as(user, pid, OperationKind::StakeAccumulated)
    }

    /// Compounds the staged reward of every compounding position in `pid`.
    /// Backend caller or owner only.
    ///
    /// # Errors
    ///
    /// - [`DexError::Forbidden`] for any other caller.
    /// - Any compounding error; nothing is compounded then.
    pub fn auto_compound(&mut self, caller: &Address, pid: usize) -> Result<Vec<(Address, Amount)>, DexError> {
        self.atomically("auto-compound", Touches::FARM_ZAP, |ex| {
            let staged = ex.farm.auto_compound(caller, pid, ex.clock.number())?;
            ex.mint_emission()?;
            staged
                .into_iter()
                .map(|(user, amount)| {
                    ex.compound_into(pid, &user, amount, OperationKind::CompoundAccumulated)
                        .map(|principal| (user, principal))
                })
                .collect()
        })
    }

    // -- mass operations ----------------------------------------------------

    fn for_each_pool(&mut self, user: &Address, op: impl Fn(&mut Self, usize) -> Result<Amount, DexError>) -> MassOutcome {
        self.farm
            .user_pools(user)
            .into_iter()
            .map(|pid| (pid, op(self, pid)))
            .collect()
    }

    /// Harvests every pool `user` holds a position in; each pool succeeds
    /// or fails on its own.
    pub fn mass_harvest(&mut self, user: &Address) -> MassOutcome {
        self.for_each_pool(user, |ex, pid| ex.harvest_as(user, pid, OperationKind::MassHarvest))
    }

    /// Stakes the reward of every pool `user` holds a position in.
    pub fn mass_stake(&mut self, user: &Address) -> MassOutcome {
        self.for_each_pool(user, |ex, pid| ex.stake_as(user, pid, OperationKind::MassStake))
    }

    /// Compounds the reward of every pool `user` holds a position in.
    pub fn mass_compound(&mut self, user: &Address) -> MassOutcome {
        self.for_each_pool(user, |ex, pid| ex.compound_as(user, pid, OperationKind::MassCompound))
    }

    // -- referral -----------------------------------------------------------

    /// Corrects `user`'s referrer; backend caller only, once per user.
    ///
    /// # Errors
    ///
    /// Any error of [`FarmAccountant::change_referrer`](crate::farm::FarmAccountant::change_referrer).
    pub fn change_referrer(&mut self, caller: &Address, user: &Address, referrer: &Address) -> Result<(), DexError> {
        self.atomically("change referrer", Touches::FARM, |ex| ex.farm.change_referrer(caller, user, referrer))
    }

    /// Mints `referrer`'s outstanding commission to them.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn claim_referral_commission(&mut self, referrer: &Address) -> Result<Amount, DexError> {
        self.atomically("claim referral commission", Touches::FARM | Touches::TOKEN, |ex| {
            let owed = ex.farm.claim_commission(referrer)?;
            let farm = ex.farm_account();
            ex.token.mint(&farm, referrer, owed)?;
            info!(%referrer, %owed, "referral commission paid");
            Ok(owed)
        })
    }

    // -- repay --------------------------------------------------------------

    fn pay_repay_reward(&mut self, user: &Address, amount: Amount) -> Result<Amount, DexError> {
        if amount.is_zero() {
            return Ok(amount);
        }
        let repay = self.config.accounts.repay;
        let token = self.token.address();
        Bank::new(&mut self.ledger, &mut self.token, repay).transfer(&token, &repay, user, amount, OperationKind::HarvestRepay)
    }

    /// Stakes receipt asset; returns the reward paid on the way.
    ///
    /// # Errors
    ///
    /// - [`DexError::TransferExceedsBalance`] if `user` or the repay
    ///   account holds too little.
    pub fn repay_deposit(&mut self, user: &Address, amount: Amount) -> Result<Amount, DexError> {
        self.atomically("repay deposit", Touches::REPAY | Touches::LEDGER | Touches::TOKEN, |ex| {
            let receipt = ex.repay.receipt_asset();
            let repay = ex.config.accounts.repay;
            ex.ledger.move_raw(&receipt, user, &repay, amount)?;
            let harvested = ex.repay.deposit(user, amount, ex.clock.number())?;
            ex.pay_repay_reward(user, harvested)
        })
    }

    /// Unstakes receipt asset; returns the reward paid on the way.
    ///
    /// # Errors
    ///
    /// - [`DexError::InsufficientBalance`] above the stake.
    /// - [`DexError::TransferExceedsBalance`] if the repay account is short.
    pub fn repay_withdraw(&mut self, user: &Address, amount: Amount) -> Result<Amount, DexError> {
        self.atomically("repay withdraw", Touches::REPAY | Touches::LEDGER | Touches::TOKEN, |ex| {
            let harvested = ex.repay.withdraw(user, amount, ex.clock.number())?;
            let receipt = ex.repay.receipt_asset();
            let repay = ex.config.accounts.repay;
            ex.ledger.move_raw(&receipt, &repay, user, amount)?;
            ex.pay_repay_reward(user, harvested)
        })
    }

    /// Pays pending compensation.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::TransferExceedsBalance`] if the repay account is short.
    pub fn repay_harvest(&mut self, user: &Address) -> Result<Amount, DexError> {
        self.atomically("repay harvest", Touches::REPAY | Touches::TOKEN, |ex| {
            let harvested = ex.repay.harvest(user, ex.clock.number())?;
            ex.pay_repay_reward(user, harvested)
        })
    }

    /// Compensation `user` could harvest now.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn repay_pending(&self, user: &Address) -> Result<Amount, DexError> {
        self.repay.pending(user, self.clock.number())
    }
}
