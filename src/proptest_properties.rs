//! Property-based tests using `proptest` for exchange invariants.
//!
//! 1. **Product non-decrease**: `r0 · r1` never shrinks across a swap.
//! 2. **Share conservation**: total LP supply equals the sum of holdings.
//! 3. **Mint then burn**: a balanced add followed by a full remove returns
//!    at most what was put in, within [`MINIMUM_LIQUIDITY`].
//! 4. **Vesting linearity**: a grant unlocks `A · t / W`, floored.
//! 5. **Switch conservation**: moving between collect options neither
//!    creates nor destroys value.

use proptest::prelude::*;

use crate::config::{ExchangeConfig, PoolConfig};
use crate::domain::{Address, Amount, BlockClock, PairKey, Rate, ONE};
use crate::error::DexError;
use crate::farm::{CollectOption, FarmAccountant, VestQueue};
use crate::ledger::Ledger;
use crate::math::{quote_output_amount, MINIMUM_LIQUIDITY};
use crate::pools::Pool;
use crate::traits::{AssetMover, FromConfig};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn asset(b: u8) -> Address {
    Address::from_bytes([b; 32])
}

fn holder(n: u8) -> Address {
    Address::from_label(&format!("holder-{n}"))
}

struct Market {
    ledger: Ledger,
    pool: Pool,
    clock: BlockClock,
}

fn market() -> Market {
    let Ok(key) = PairKey::new(asset(1), asset(2)) else {
        panic!("pair");
    };
    let mut ledger = Ledger::new(Address::from_label("native"), Address::from_label("wrapped"));
    for n in 0..4 {
        for a in [asset(1), asset(2)] {
            let Ok(()) = ledger.credit(&a, &holder(n), Amount::new(1_000_000_000 * ONE)) else {
                panic!("credit");
            };
        }
    }
    Market {
        ledger,
        pool: Pool::new(Address::from_label("pool"), key, &PoolConfig::default()),
        clock: BlockClock::new(1, 1_000),
    }
}

fn add(m: &mut Market, who: Address, a0: u128, a1: u128) -> Result<Amount, DexError> {
    let pool = m.pool.address();
    m.ledger.move_raw(&asset(1), &who, &pool, Amount::new(a0))?;
    m.ledger.move_raw(&asset(2), &who, &pool, Amount::new(a1))?;
    m.pool.mint(&mut m.ledger, &who, &m.clock, None)
}

fn remove(m: &mut Market, who: Address, shares: Amount) -> Result<(Amount, Amount), DexError> {
    let pool = m.pool.address();
    m.ledger.move_raw(&pool, &who, &pool, shares)?;
    m.pool.burn(&mut m.ledger, &who, &m.clock, None)
}

fn product(pool: &Pool) -> ethnum::U256 {
    let (r0, r1, _) = pool.reserves();
    ethnum::U256::from(r0.get()) * ethnum::U256::from(r1.get())
}

// ---------------------------------------------------------------------------
// Pool properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn product_never_decreases_across_swaps(
        r0 in 1_000u128..1_000_000,
        r1 in 1_000u128..1_000_000,
        swaps in prop::collection::vec((any::<bool>(), 1u128..100_000), 1..8),
    ) {
        let mut m = market();
        prop_assert!(add(&mut m, holder(0), r0 * ONE, r1 * ONE).is_ok());
        let trader = holder(1);
        let fee = m.pool.swap_fee();
        for (zero_for_one, amount) in swaps {
            let before = product(&m.pool);
            let (reserve0, reserve1, _) = m.pool.reserves();
            let amount_in = Amount::new(amount * ONE / 100);
            let (asset_in, reserve_in, reserve_out) = if zero_for_one {
                (asset(1), reserve0, reserve1)
            } else {
                (asset(2), reserve1, reserve0)
            };
            let Ok(out) = quote_output_amount(amount_in, reserve_in, reserve_out, fee) else {
                continue;
            };
            if out.is_zero() {
                continue;
            }
            let pool = m.pool.address();
            prop_assert!(m.ledger.move_raw(&asset_in, &trader, &pool, amount_in).is_ok());
            let (out0, out1) = if zero_for_one { (Amount::ZERO, out) } else { (out, Amount::ZERO) };
            prop_assert!(m.pool.swap(&mut m.ledger, out0, out1, &trader, &m.clock).is_ok());
            prop_assert!(product(&m.pool) >= before);
        }
    }

    #[test]
    fn shares_are_conserved_over_mints_and_burns(
        ops in prop::collection::vec((0u8..4, any::<bool>(), 1u128..10_000), 1..20),
    ) {
        let mut m = market();
        prop_assert!(add(&mut m, holder(0), 10_000 * ONE, 10_000 * ONE).is_ok());
        for (who, is_mint, size) in ops {
            let who = holder(who);
            if is_mint {
                let _ = add(&mut m, who, size * ONE, size * ONE);
            } else {
                let held = m.pool.share_balance(&m.ledger, &who);
                let shares = Amount::new(held.get() / 10_000 * size.min(10_000));
                if !shares.is_zero() {
                    let _ = remove(&mut m, who, shares);
                }
            }
            let pool = m.pool.address();
            let held: u128 = m
                .ledger
                .book(&pool)
                .map(|book| book.holders().map(|(_, amount)| amount.get()).sum())
                .unwrap_or_default();
            prop_assert_eq!(m.ledger.total_supply(&pool).get(), held);
        }
    }

    #[test]
    fn balanced_mint_then_burn_never_gains(
        seed in 1_000u128..1_000_000,
        deposit in 1u128..1_000_000,
    ) {
        let mut m = market();
        prop_assert!(add(&mut m, holder(0), seed * ONE, seed * ONE).is_ok());
        let amount = deposit * ONE;
        let Ok(shares) = add(&mut m, holder(1), amount, amount) else {
            return Err(TestCaseError::fail("mint"));
        };
        let Ok((out0, out1)) = remove(&mut m, holder(1), shares) else {
            return Err(TestCaseError::fail("burn"));
        };
        for out in [out0, out1] {
            prop_assert!(out.get() <= amount);
            prop_assert!(amount - out.get() <= MINIMUM_LIQUIDITY.get());
        }
    }
}

// ---------------------------------------------------------------------------
// Farm properties
// ---------------------------------------------------------------------------

fn option(n: u8) -> CollectOption {
    CollectOption::ALL[usize::from(n % 4)]
}

fn total_held(f: &FarmAccountant, pid: usize, who: &Address, block: u64) -> u128 {
    let Some(info) = f.user_info(pid, who) else {
        return 0;
    };
    let Ok(pending) = f.pending_reward(pid, who, block) else {
        return 0;
    };
    let vest = info.vest.outstanding().unwrap_or_default();
    info.amount.get() + info.accumulated.get() + info.staged.get() + vest.get() + pending.get()
}

proptest! {
    #[test]
    fn vest_unlocks_linearly(
        amount in 1u128..1_000_000_000_000_000_000_000,
        start in 0u64..1_000_000,
        window in 1u64..10_000_000,
        elapsed in 0u64..20_000_000,
    ) {
        let mut queue = VestQueue::default();
        queue.push(Amount::new(amount), start);
        let Ok(unlocked) = queue.withdrawable(start + elapsed, window) else {
            return Err(TestCaseError::fail("withdrawable"));
        };
        let expected = if elapsed >= window {
            amount
        } else {
            amount * u128::from(elapsed) / u128::from(window)
        };
        prop_assert_eq!(unlocked, Amount::new(expected));
    }

    #[test]
    fn switching_options_conserves_value(
        stakes in prop::collection::vec(1u128..1_000_000, 2..5),
        switches in prop::collection::vec((0u8..4, 1u64..50), 1..10),
    ) {
        let owner = Address::from_label("owner");
        let mut cfg = ExchangeConfig::new(owner);
        cfg.farm.reward_per_block = Amount::new(1_000 * ONE);
        let Ok(mut farm) = FarmAccountant::from_config(&cfg) else {
            return Err(TestCaseError::fail("farm"));
        };
        let Ok(pid) = farm.add_pool(&owner, Address::from_label("lp"), 1_000, Rate::ZERO, 0) else {
            return Err(TestCaseError::fail("pool"));
        };
        for (n, stake) in stakes.iter().enumerate() {
            let who = holder(u8::try_from(n).unwrap_or_default());
            prop_assert!(farm.deposit(pid, &who, Amount::new(*stake), 0, None).is_ok());
        }
        let mover = holder(0);
        let mut block = 0;
        for (target, gap) in switches {
            block += gap;
            let before = total_held(&farm, pid, &mover, block);
            prop_assert!(farm.switch_collect_option(pid, &mover, option(target), block).is_ok());
            prop_assert_eq!(total_held(&farm, pid, &mover, block), before);
        }
    }
}

#[test]
fn ledger_mover_reports_pool_shares() {
    let mut m = market();
    let Ok(shares) = add(&mut m, holder(0), 500 * ONE, 500 * ONE) else {
        panic!("mint");
    };
    let pool = m.pool.address();
    assert_eq!(m.ledger.balance_of(&pool, &holder(0)), shares);
    assert_eq!(
        AssetMover::total_supply(&m.ledger, &pool),
        Amount::new(shares.get() + MINIMUM_LIQUIDITY.get())
    );
}
