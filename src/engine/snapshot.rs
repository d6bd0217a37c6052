//! Scoped rollback state for [`Exchange::atomically`].
//!
//! An entry point names the components it may mutate with [`Touches`];
//! only those are copied before it runs and restored if it fails.

use core::ops::BitOr;

use super::Exchange;
use crate::farm::{FarmAccountant, RepayAccountant};
use crate::ledger::Ledger;
use crate::registry::PoolRegistry;
use crate::token::FeeRouter;

/// Set of engine components an operation may mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Touches(u8);

impl Touches {
    /// Non-token asset balances.
    pub const LEDGER: Self = Self(1);
    /// Fee-token balances, allowances and fee state.
    pub const TOKEN: Self = Self(1 << 1);
    /// Pools, listings and protocol-fee settings.
    pub const POOLS: Self = Self(1 << 2);
    /// Farm books.
    pub const FARM: Self = Self(1 << 3);
    /// Repay books.
    pub const REPAY: Self = Self(1 << 4);

    /// Everything a router call can reach.
    pub const MARKET: Self = Self::LEDGER.union(Self::TOKEN).union(Self::POOLS);
    /// A farm call paying out either kind of asset.
    pub const FARM_PAYOUT: Self = Self::FARM.union(Self::LEDGER).union(Self::TOKEN);
    /// A farm call that may also zap through the router.
    pub const FARM_ZAP: Self = Self::FARM_PAYOUT.union(Self::POOLS);

    /// Both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if every component of `other` is in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Touches {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Copies of the components in one [`Touches`] set.
#[derive(Debug)]
pub(super) struct Snapshot {
    ledger: Option<Ledger>,
    token: Option<FeeRouter>,
    registry: Option<PoolRegistry>,
    farm: Option<FarmAccountant>,
    repay: Option<RepayAccountant>,
}

impl Snapshot {
    pub(super) fn take(ex: &Exchange, scope: Touches) -> Self {
        Self {
            ledger: scope.contains(Touches::LEDGER).then(|| ex.ledger.clone()),
            token: scope.contains(Touches::TOKEN).then(|| ex.token.clone()),
            registry: scope.contains(Touches::POOLS).then(|| ex.registry.clone()),
            farm: scope.contains(Touches::FARM).then(|| ex.farm.clone()),
            repay: scope.contains(Touches::REPAY).then(|| ex.repay.clone()),
        }
    }

    pub(super) fn restore(self, ex: &mut Exchange) {
        if let Some(ledger) = self.ledger {
            ex.ledger = ledger;
        }
        if let Some(token) = self.token {
            ex.token = token;
        }
        if let Some(registry) = self.registry {
            ex.registry = registry;
        }
        if let Some(farm) = self.farm {
            ex.farm = farm;
        }
        if let Some(repay) = self.repay {
            ex.repay = repay;
        }
    }
}

/// Returns `true` if nothing outside `scope` differs between the two.
#[cfg(test)]
pub(super) fn only_scope_changed(before: &Exchange, after: &Exchange, scope: Touches) -> bool {
    before.config == after.config
        && before.clock == after.clock
        && before.router == after.router
        && (scope.contains(Touches::LEDGER) || before.ledger == after.ledger)
        && (scope.contains(Touches::TOKEN) || before.token == after.token)
        && (scope.contains(Touches::POOLS) || before.registry == after.registry)
        && (scope.contains(Touches::FARM) || before.farm == after.farm)
        && (scope.contains(Touches::REPAY) || before.repay == after.repay)
}
