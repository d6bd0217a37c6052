//! Referrer links and outstanding commissions.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::domain::{Address, Amount, Rate};
use crate::error::DexError;
use crate::math::CheckedArithmetic;

/// Who referred whom, and what each referrer is owed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferralBook {
    referrers: BTreeMap<Address, Address>,
    corrected: BTreeSet<Address>,
    outstanding: BTreeMap<Address, Amount>,
    total_paid: Amount,
}

impl ReferralBook {
    /// Referrer of `user`, if any.
    #[must_use]
    pub fn referrer(&self, user: &Address) -> Option<Address> {
        self.referrers.get(user).copied()
    }

    /// Commission owed to `referrer`.
    #[must_use]
    pub fn outstanding(&self, referrer: &Address) -> Amount {
        self.outstanding.get(referrer).copied().unwrap_or_default()
    }

    /// Commission claimed so far by every referrer.
    #[must_use]
    pub const fn total_paid(&self) -> Amount {
        self.total_paid
    }

    /// Links `user` to `referrer` unless a link already exists.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidReferrer`] for a self-referral or null referrer.
    pub fn record(&mut self, user: &Address, referrer: &Address) -> Result<(), DexError> {
        if referrer == user || referrer.is_zero() {
            return Err(DexError::InvalidReferrer);
        }
        if !self.referrers.contains_key(user) {
            self.referrers.insert(*user, *referrer);
            info!(%user, %referrer, "referrer recorded");
        }
        Ok(())
    }

    /// Replaces `user`'s referrer; allowed once per user.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::InvalidReferrer`] if already corrected, or for a
    /// self-referral or null referrer.
    pub fn change(&mut self, user: &Address, referrer: &Address) -> Result<(), DexError> {
        if referrer == user || referrer.is_zero() || self.corrected.contains(user) {
            return Err(DexError::InvalidReferrer);
        }
        self.corrected.insert(*user);
        self.referrers.insert(*user, *referrer);
        info!(%user, %referrer, "referrer changed");
        Ok(())
    }

    /// Credits `user`'s referrer with `rate` of `payout`.
    ///
    /// Returns the commission credited (zero without a referrer).
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn accrue(&mut self, user: &Address, payout: Amount, rate: Rate) -> Result<Amount, DexError> {
        let Some(referrer) = self.referrer(user) else {
            return Ok(Amount::ZERO);
        };
        let commission = rate.apply(payout)?;
        if !commission.is_zero() {
            let owed = self.outstanding(&referrer).safe_add(&commission)?;
            self.outstanding.insert(referrer, owed);
        }
        Ok(commission)
    }

    /// Zeroes and returns what `referrer` is owed.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn claim(&mut self, referrer: &Address) -> Result<Amount, DexError> {
        let owed = self.outstanding.remove(referrer).unwrap_or_default();
        self.total_paid = self.total_paid.safe_add(&owed)?;
        Ok(owed)
    }
}
