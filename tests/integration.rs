//! End-to-end tests driving the public [`Exchange`] API.
//!
//! These cover the pool lifecycle under deviation guards, native-coin
//! routing, the fee token's fee split and transfer cap, and the farm's
//! vesting, emergency and referral flows.

#![allow(clippy::panic)]

use crosswise_dex::prelude::*;
use crosswise_dex::registry::AssetStatus;
use crosswise_dex::router::{AddLiquidity, LiquidityAdded, RemoveLiquidity, SwapExactIn};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn owner() -> Address {
    Address::from_label("owner")
}

fn usdt() -> Address {
    Address::from_label("usdt")
}

fn busd() -> Address {
    Address::from_label("busd")
}

fn user(name: &str) -> Address {
    Address::from_label(name)
}

fn exchange() -> Exchange {
    let mut cfg = ExchangeConfig::new(owner());
    cfg.fee_router.initial_supply = Amount::new(1_000_000 * ONE);
    cfg.backend_caller = Some(user("backend"));
    let Ok(mut ex) = Exchange::from_config(&cfg) else {
        panic!("exchange");
    };
    for asset in [usdt(), busd()] {
        let Ok(()) = ex.set_asset_status(&owner(), asset, AssetStatus::Enlisted) else {
            panic!("enlist");
        };
        let Ok(()) = ex.mint_asset(&owner(), asset, &owner(), Amount::new(1_000_000 * ONE)) else {
            panic!("mint");
        };
    }
    ex
}

fn add(ex: &mut Exchange, a: Address, b: Address, amount_a: u128, amount_b: u128) -> LiquidityAdded {
    let Ok(added) = ex.add_liquidity(
        &owner(),
        &AddLiquidity {
            asset_a: a,
            asset_b: b,
            amount_a_desired: Amount::new(amount_a),
            amount_b_desired: Amount::new(amount_b),
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            to: owner(),
            deadline: u64::MAX,
        },
    ) else {
        panic!("add liquidity");
    };
    added
}

fn remove(ex: &mut Exchange, a: Address, b: Address, shares: Amount) -> Result<(Amount, Amount)> {
    ex.remove_liquidity(
        &owner(),
        &RemoveLiquidity {
            asset_a: a,
            asset_b: b,
            shares,
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            to: owner(),
            deadline: u64::MAX,
        },
    )
}

fn swap(ex: &mut Exchange, payer: &Address, amount_in: u128, path: Vec<Address>) -> Result<Amount> {
    let to = *payer;
    ex.swap_exact_tokens_for_tokens(
        payer,
        &SwapExactIn {
            amount_in: Amount::new(amount_in),
            amount_out_min: Amount::ZERO,
            path,
            to,
            deadline: u64::MAX,
        },
    )
}

// ---------------------------------------------------------------------------
// Pools and guards
// ---------------------------------------------------------------------------

#[test]
fn first_provider_gets_geometric_mean_minus_minimum() {
    let mut ex = exchange();
    let added = add(&mut ex, usdt(), busd(), 500 * ONE, 500 * ONE);
    assert_eq!(added.shares, Amount::new(500 * ONE - 1_000));
    let Some(pool) = ex.pool(usdt(), busd()) else {
        panic!("pool");
    };
    assert_eq!(ex.total_supply(&pool.address()), Amount::new(500 * ONE));
    assert_eq!(ex.registry().pool_count(), 1);
}

#[test]
fn price_guard_rejects_large_swap_and_routes_swap_fees() {
    let mut ex = exchange();
    let token = ex.token().address();
    add(&mut ex, token, usdt(), 1_000 * ONE, 100 * ONE);
    let Ok(()) = ex.set_deviation_limits(&owner(), Some(5_000), Some(5_000)) else {
        panic!("limits");
    };
    let trader = user("trader");
    let Ok(_) = ex.transfer(&owner(), &trader, Amount::new(1_000 * ONE)) else {
        panic!("fund trader");
    };

    let rejected = swap(&mut ex, &trader, 100 * ONE, vec![token, usdt()]);
    assert!(matches!(
        rejected,
        Err(DexError::ExcessiveDeviationFromPreviousPrice { .. })
    ));

    let stores = *ex.token().stores();
    let balances = |ex: &Exchange| {
        (
            ex.balance_of(&token, &stores.dev),
            ex.balance_of(&token, &stores.buyback),
            ex.token().liquidity_bucket(),
            ex.balance_of(&token, &stores.treasury),
        )
    };
    let before = balances(&ex);
    let gross = ONE / 100;
    let Ok(received) = swap(&mut ex, &trader, gross, vec![token, usdt()]) else {
        panic!("small swap");
    };
    assert!(received > Amount::ZERO);
    let after = balances(&ex);
    assert_eq!(after.0.get() - before.0.get(), gross * 40 / 100_000);
    assert_eq!(after.1.get() - before.1.get(), gross * 30 / 100_000);
    assert_eq!(after.2.get() - before.2.get(), gross * 30 / 100_000);
    assert_eq!(after.3.get() - before.3.get(), gross * 30 / 100_000);
}

#[test]
fn liquidity_guard_allows_only_small_removals() {
    let mut ex = exchange();
    let added = add(&mut ex, usdt(), busd(), 1_000 * ONE, 100 * ONE);
    let Ok(()) = ex.set_deviation_limits(&owner(), Some(5_000), Some(5_000)) else {
        panic!("limits");
    };
    let before = ex.clone();
    let big = Amount::new(added.shares.get() / 100);
    assert!(matches!(
        remove(&mut ex, usdt(), busd(), big),
        Err(DexError::ExcessiveLiquidityDeviation { .. })
    ));
    assert_eq!(ex, before);

    let small = Amount::new(added.shares.get() / 10_000);
    let Ok((out_usdt, out_busd)) = remove(&mut ex, usdt(), busd(), small) else {
        panic!("small removal");
    };
    assert!(out_usdt > out_busd);
}

#[test]
fn exact_in_quote_matches_execution_for_plain_assets() {
    let mut ex = exchange();
    add(&mut ex, usdt(), busd(), 10_000 * ONE, 10_000 * ONE);
    let path = vec![usdt(), busd()];
    let Ok(quoted) = ex.get_amounts_out(Amount::new(10 * ONE), &path) else {
        panic!("quote");
    };
    let Ok(received) = swap(&mut ex, &owner(), 10 * ONE, path) else {
        panic!("swap");
    };
    assert_eq!(quoted.last().copied(), Some(received));
}

#[test]
fn native_routing_leaves_router_empty() {
    let mut ex = exchange();
    let native = ex.config().accounts.native;
    let wrapped = ex.config().accounts.wrapped;
    let router = ex.router().address();
    let Ok(()) = ex.mint_asset(&owner(), native, &owner(), Amount::new(1_000 * ONE)) else {
        panic!("native");
    };
    let params = |usdt_amount: u128, native_amount: u128| AddLiquidity {
        asset_a: usdt(),
        asset_b: wrapped,
        amount_a_desired: Amount::new(usdt_amount),
        amount_b_desired: Amount::new(native_amount),
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
        to: owner(),
        deadline: u64::MAX,
    };
    let Ok(first) = ex.add_liquidity_native(&owner(), &params(100 * ONE, 10 * ONE)) else {
        panic!("first native add");
    };
    let native_before = ex.balance_of(&native, &owner());
    let Ok(second) = ex.add_liquidity_native(&owner(), &params(10 * ONE, 5 * ONE)) else {
        panic!("second native add");
    };
    assert_eq!(second.amount_b, Amount::new(ONE));
    assert_eq!(ex.balance_of(&native, &owner()), Amount::new(native_before.get() - ONE));

    let Ok(_) = ex.remove_liquidity_native(
        &owner(),
        &RemoveLiquidity {
            asset_a: usdt(),
            asset_b: wrapped,
            shares: Amount::new(first.shares.get() / 2),
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
            to: owner(),
            deadline: u64::MAX,
        },
    ) else {
        panic!("native removal");
    };
    for asset in [native, wrapped, usdt()] {
        assert_eq!(ex.balance_of(&asset, &router), Amount::ZERO);
    }
}

// ---------------------------------------------------------------------------
// Fee token
// ---------------------------------------------------------------------------

#[test]
fn plain_transfer_splits_four_three_three() {
    let mut ex = exchange();
    let token = ex.token().address();
    let stores = *ex.token().stores();
    let alice = user("alice");
    let Ok(net) = ex.transfer(&owner(), &alice, Amount::new(10_000)) else {
        panic!("transfer");
    };
    assert_eq!(net, Amount::new(9_990));
    assert_eq!(ex.balance_of(&token, &alice), Amount::new(9_990));
    assert_eq!(ex.balance_of(&token, &stores.dev), Amount::new(4));
    assert_eq!(ex.balance_of(&token, &stores.buyback), Amount::new(3));
    assert_eq!(ex.token().liquidity_bucket(), Amount::new(3));
    assert_eq!(ex.balance_of(&token, &stores.treasury), Amount::ZERO);
}

#[test]
fn transfer_cap_is_cumulative_within_a_call() {
    let mut ex = exchange();
    let alice = user("alice");
    let bob = user("bob");
    let Ok(_) = ex.transfer(&owner(), &alice, Amount::new(100_000 * ONE)) else {
        panic!("fund");
    };
    // 5% of the 1M supply.
    assert!(matches!(
        ex.transfer(&alice, &bob, Amount::new(50_000 * ONE)),
        Err(DexError::ExceedsMaxTransferAmount { .. })
    ));
    let Ok(_) = ex.transfer(&alice, &bob, Amount::new(49_000 * ONE)) else {
        panic!("below the cap");
    };
    let before = ex.clone();
    let batch = [(bob, Amount::new(30_000 * ONE)), (bob, Amount::new(20_000 * ONE))];
    assert!(matches!(
        ex.transfer_many(&alice, &batch),
        Err(DexError::ExceedsMaxTransferAmount { .. })
    ));
    assert_eq!(ex, before);
}

#[test]
fn allowance_bounds_transfer_from() {
    let mut ex = exchange();
    let spender = user("spender");
    let alice = user("alice");
    let Ok(()) = ex.approve(&owner(), &spender, Amount::new(1_000)) else {
        panic!("approve");
    };
    assert!(matches!(
        ex.transfer_from(&spender, &owner(), &alice, Amount::new(1_001)),
        Err(DexError::TransferExceedsAllowance { .. })
    ));
    let Ok(_) = ex.transfer_from(&spender, &owner(), &alice, Amount::new(1_000)) else {
        panic!("transfer from");
    };
    assert_eq!(ex.token().allowance(&owner(), &spender), Amount::ZERO);
}

// ---------------------------------------------------------------------------
// Farm
// ---------------------------------------------------------------------------

fn staked(alice: &Address) -> Exchange {
    let mut ex = exchange();
    let Ok(()) = ex.set_reward_per_block(&owner(), Amount::new(ONE)) else {
        panic!("rate");
    };
    let Ok(_) = ex.transfer(&owner(), alice, Amount::new(2_000 * ONE)) else {
        panic!("fund");
    };
    let Ok(_) = ex.enter_staking(alice, Amount::new(1_000 * ONE)) else {
        panic!("stake");
    };
    ex
}

#[test]
fn vested_reward_unlocks_over_the_window() {
    let alice = user("alice");
    let mut ex = staked(&alice);
    let Ok(()) = ex.switch_collect_option(&alice, 0, CollectOption::OffOn) else {
        panic!("switch");
    };
    ex.advance_clock(100, 300);
    let Ok(_) = ex.mass_update_pools() else {
        panic!("update");
    };
    let Ok(()) = ex.switch_collect_option(&alice, 0, CollectOption::OffOff) else {
        panic!("settle into vest");
    };
    let Some(info) = ex.farm().user_info(0, &alice) else {
        panic!("position");
    };
    let Ok(granted) = info.vest.outstanding() else {
        panic!("outstanding");
    };
    assert!(granted > Amount::new(99 * ONE));

    assert_eq!(ex.withdrawable_vest(0, &alice), Ok(Amount::ZERO));
    let window = ex.config().farm.vest_window_blocks;
    ex.advance_clock(window, 0);
    assert_eq!(ex.withdrawable_vest(0, &alice), Ok(granted));
    let token = ex.token().address();
    let before = ex.balance_of(&token, &alice);
    let Ok(paid) = ex.withdraw_vest(&alice, 0, granted) else {
        panic!("withdraw vest");
    };
    assert!(ex.balance_of(&token, &alice) > before);
    assert!(paid <= granted);
}

#[test]
fn emergency_withdraw_forfeits_rewards() {
    let alice = user("alice");
    let mut ex = staked(&alice);
    ex.advance_clock(100, 300);
    let Ok(pending) = ex.pending_reward(0, &alice) else {
        panic!("pending");
    };
    assert!(pending > Amount::ZERO);
    let Ok(returned) = ex.emergency_withdraw(&alice, 0) else {
        panic!("emergency");
    };
    assert!(returned > Amount::ZERO);
    assert_eq!(ex.pending_reward(0, &alice), Ok(Amount::ZERO));
    assert_eq!(ex.emergency_withdraw(&alice, 0), Err(DexError::ZeroAmount));
}

#[test]
fn referral_commission_accrues_and_is_claimable_once() {
    let mut ex = exchange();
    let alice = user("alice");
    let bob = user("bob");
    let Ok(()) = ex.set_reward_per_block(&owner(), Amount::new(ONE)) else {
        panic!("rate");
    };
    let Ok(_) = ex.transfer(&owner(), &alice, Amount::new(1_000 * ONE)) else {
        panic!("fund");
    };
    assert_eq!(
        ex.deposit(&alice, 0, Amount::new(100 * ONE), Some(alice)),
        Err(DexError::InvalidReferrer)
    );
    let Ok(_) = ex.deposit(&alice, 0, Amount::new(100 * ONE), Some(bob)) else {
        panic!("deposit");
    };
    ex.advance_clock(20, 60);
    let Ok(_) = ex.harvest(&alice, 0) else {
        panic!("harvest");
    };
    let Ok(claimed) = ex.claim_referral_commission(&bob) else {
        panic!("claim");
    };
    assert!(claimed > Amount::ZERO);
    assert_eq!(ex.claim_referral_commission(&bob), Ok(Amount::ZERO));
}

#[test]
fn failed_farm_call_leaves_no_trace() {
    let alice = user("alice");
    let mut ex = staked(&alice);
    ex.advance_clock(10, 30);
    let before = ex.clone();
    assert!(ex.withdraw(&alice, 0, Amount::new(10_000 * ONE)).is_err());
    assert_eq!(ex, before);
}
