//! Auto-liquify of the fee token's liquidity bucket.
//!
//! Once the bucket reaches its threshold, half of it is swapped for the
//! paired asset and both halves are supplied to the `(token, paired)`
//! pool, with the LP shares going to the liquidity store.  The run is
//! best effort: a failure is logged and rolled back without failing the
//! transfer that triggered it.  Only the market components are rolled
//! back; the transfer's own state is already committed.

use tracing::{info, warn};

use super::snapshot::{Snapshot, Touches};
use super::{Bank, Exchange};
use crate::domain::{Address, Amount, Rounding};
use crate::error::DexError;
use crate::math::CheckedArithmetic;
use crate::router::{AddLiquidity, LiquidityAdded, SwapExactIn};

impl Exchange {
    pub(super) fn liquify_if_due(&mut self) {
        let Some((bucket, paired)) = self.token.liquify_due() else {
            return;
        };
        let snapshot = Snapshot::take(self, Touches::MARKET);
        match self.liquify(bucket, paired) {
            Ok(added) => {
                info!(%bucket, %paired, shares = %added.shares, "auto-liquify completed");
            }
            Err(err) => {
                warn!(%bucket, %paired, error = %err, "auto-liquify skipped");
                snapshot.restore(self);
            }
        }
    }

    fn liquify(&mut self, bucket: Amount, paired: Address) -> Result<LiquidityAdded, DexError> {
        self.token.begin_liquify()?;
        let out = self.liquify_locked(bucket, paired);
        self.token.end_liquify();
        out
    }

    fn liquify_locked(&mut self, bucket: Amount, paired: Address) -> Result<LiquidityAdded, DexError> {
        let token = self.token.address();
        let half = bucket.safe_div(&Amount::new(2), Rounding::Down)?;
        let rest = bucket.safe_sub(&half)?;
        let deadline = self.clock.timestamp();
        let to = self.token.stores().liquidity;
        let mut bank = Bank::exempt(&mut self.ledger, &mut self.token, self.router.address());
        let received = self.router.swap_exact_tokens_for_tokens(
            &mut self.registry,
            &mut bank,
            &self.clock,
            &token,
            &SwapExactIn {
                amount_in: half,
                amount_out_min: Amount::ZERO,
                path: vec![token, paired],
                to: token,
                deadline,
            },
        )?;
        self.router.add_liquidity(
            &mut self.registry,
            &mut bank,
            &self.clock,
            &token,
            &AddLiquidity {
                asset_a: token,
                asset_b: paired,
                amount_a_desired: rest,
                amount_b_desired: received,
                amount_a_min: Amount::ZERO,
                amount_b_min: Amount::ZERO,
                to,
                deadline,
            },
        )
    }
}
