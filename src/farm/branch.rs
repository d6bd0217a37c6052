//! The 2×2 collect-option matrix.
//!
//! | Option | Compounds | Vests | Sub-pools |
//! |--------|-----------|-------|-----------|
//! | `OffOff` | no | no | `Accum` |
//! | `OnOff` | yes | no | `Comp`, `PreComp` |
//! | `OnOn` | yes | yes | `Comp`, `PreComp`, `Vest` |
//! | `OffOn` | no | yes | `Vest`, `Accum` |
//!
//! Principal sits in `Comp` for compounding options and in `Accum`
//! otherwise.  `PreComp` holds settled reward waiting to be compounded
//! and earns alongside principal.  `Vest` counts reward routed into vest
//! grants; grants unlock on their own schedule and take no emission.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::accrual::SubPool;
use crate::domain::Amount;
use crate::error::DexError;
use crate::math::CheckedArithmetic;

/// How a user's settled reward is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollectOption {
    /// Reward accumulates for manual harvest.
    #[default]
    OffOff,
    /// Reward is staged for compounding.
    OnOff,
    /// Half is staged for compounding, half vests.
    OnOn,
    /// Reward vests.
    OffOn,
}

impl CollectOption {
    /// Every option in branch order.
    pub const ALL: [Self; 4] = [Self::OffOff, Self::OnOff, Self::OnOn, Self::OffOn];

    /// Position in the branch array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::OffOff => 0,
            Self::OnOff => 1,
            Self::OnOn => 2,
            Self::OffOn => 3,
        }
    }

    /// Returns `true` if settled reward is staged for compounding.
    #[must_use]
    pub const fn is_compounding(self) -> bool {
        matches!(self, Self::OnOff | Self::OnOn)
    }

    /// Returns `true` if settled reward vests.
    #[must_use]
    pub const fn is_vesting(self) -> bool {
        matches!(self, Self::OnOn | Self::OffOn)
    }
}

impl fmt::Display for CollectOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Named sub-pool of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubPoolKind {
    /// Principal of a compounding option.
    Comp,
    /// Reward staged for compounding.
    PreComp,
    /// Reward routed to vest grants.
    Vest,
    /// Principal of a non-compounding option.
    Accum,
}

impl fmt::Display for SubPoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Sub-pools of one collect option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Manual harvest.
    OffOff {
        /// Principal.
        accum: SubPool,
    },
    /// Compounding.
    OnOff {
        /// Principal.
        comp: SubPool,
        /// Reward waiting to compound.
        pre_comp: SubPool,
    },
    /// Compounding and vesting.
    OnOn {
        /// Principal.
        comp: SubPool,
        /// Reward waiting to compound.
        pre_comp: SubPool,
        /// Reward routed to vest grants.
        vest: SubPool,
    },
    /// Vesting.
    OffOn {
        /// Reward routed to vest grants.
        vest: SubPool,
        /// Principal.
        accum: SubPool,
    },
}

impl Branch {
    /// An empty branch for `option`.
    #[must_use]
    pub fn empty(option: CollectOption) -> Self {
        let empty = SubPool::default();
        match option {
            CollectOption::OffOff => Self::OffOff { accum: empty },
            CollectOption::OnOff => Self::OnOff {
                comp: empty,
                pre_comp: empty,
            },
            CollectOption::OnOn => Self::OnOn {
                comp: empty,
                pre_comp: empty,
                vest: empty,
            },
            CollectOption::OffOn => Self::OffOn {
                vest: empty,
                accum: empty,
            },
        }
    }

    /// The four branches in [`CollectOption::ALL`] order.
    #[must_use]
    pub fn matrix() -> [Self; 4] {
        CollectOption::ALL.map(Self::empty)
    }

    /// The option this branch serves.
    #[must_use]
    pub const fn option(&self) -> CollectOption {
        match self {
            Self::OffOff { .. } => CollectOption::OffOff,
            Self::OnOff { .. } => CollectOption::OnOff,
            Self::OnOn { .. } => CollectOption::OnOn,
            Self::OffOn { .. } => CollectOption::OffOn,
        }
    }

    /// Sub-pool `kind`, if this branch has one.
    #[must_use]
    pub const fn sub_pool(&self, kind: SubPoolKind) -> Option<&SubPool> {
        match (self, kind) {
            (Self::OffOff { accum: sub } | Self::OffOn { accum: sub, .. }, SubPoolKind::Accum)
            | (Self::OnOff { comp: sub, .. } | Self::OnOn { comp: sub, .. }, SubPoolKind::Comp)
            | (
                Self::OnOff { pre_comp: sub, .. } | Self::OnOn { pre_comp: sub, .. },
                SubPoolKind::PreComp,
            )
            | (Self::OnOn { vest: sub, .. } | Self::OffOn { vest: sub, .. }, SubPoolKind::Vest) => Some(sub),
            _ => None,
        }
    }

    /// Every sub-pool with its name.
    #[must_use]
    pub fn sub_pools(&self) -> Vec<(SubPoolKind, SubPool)> {
        [
            SubPoolKind::Comp,
            SubPoolKind::PreComp,
            SubPoolKind::Vest,
            SubPoolKind::Accum,
        ]
        .into_iter()
        .filter_map(|kind| self.sub_pool(kind).map(|sub| (kind, *sub)))
        .collect()
    }

    /// Principal sub-pool: `Comp` or `Accum`.
    #[must_use]
    pub const fn principal(&self) -> &SubPool {
        match self {
            Self::OffOff { accum } | Self::OffOn { accum, .. } => accum,
            Self::OnOff { comp, .. } | Self::OnOn { comp, .. } => comp,
        }
    }

    /// Mutable principal sub-pool.
    pub fn principal_mut(&mut self) -> &mut SubPool {
        match self {
            Self::OffOff { accum } | Self::OffOn { accum, .. } => accum,
            Self::OnOff { comp, .. } | Self::OnOn { comp, .. } => comp,
        }
    }

    /// `PreComp`, on compounding branches.
    #[must_use]
    pub const fn pre_comp(&self) -> Option<&SubPool> {
        match self {
            Self::OnOff { pre_comp, .. } | Self::OnOn { pre_comp, .. } => Some(pre_comp),
            Self::OffOff { .. } | Self::OffOn { .. } => None,
        }
    }

    /// Sub-pools that take a share of emission.
    pub(crate) fn earning_mut(&mut self) -> Vec<&mut SubPool> {
        match self {
            Self::OffOff { accum } | Self::OffOn { accum, .. } => vec![accum],
            Self::OnOff { comp, pre_comp } | Self::OnOn { comp, pre_comp, .. } => vec![comp, pre_comp],
        }
    }

    /// Bulk that takes a share of emission.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::ArithmeticOverflow`] on overflow.
    pub fn earning_bulk(&self) -> Result<Amount, DexError> {
        let staged = self.pre_comp().map_or(Amount::ZERO, SubPool::bulk);
        self.principal().bulk().safe_add(&staged)
    }

    /// Reward staged for compounding; zero for non-compounding branches.
    #[must_use]
    pub fn staged(&self) -> Amount {
        self.pre_comp().map_or(Amount::ZERO, SubPool::bulk)
    }

    /// Reward routed to vesting; zero for non-vesting branches.
    #[must_use]
    pub fn vested(&self) -> Amount {
        self.sub_pool(SubPoolKind::Vest).map_or(Amount::ZERO, SubPool::bulk)
    }

    /// Adjusts the `PreComp` bulk.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidConfiguration`] on a non-compounding branch.
    /// - [`DexError::ArithmeticOverflow`] on over- or underflow.
    pub fn shift_staged(&mut self, add: Amount, remove: Amount) -> Result<(), DexError> {
        match self {
            Self::OnOff { pre_comp, .. } | Self::OnOn { pre_comp, .. } => {
                pre_comp.add_bulk(add)?;
                pre_comp.remove_bulk(remove)
            }
            Self::OffOff { .. } | Self::OffOn { .. } => {
                if add.is_zero() && remove.is_zero() {
                    Ok(())
                } else {
                    Err(DexError::InvalidConfiguration("branch does not compound"))
                }
            }
        }
    }

    /// Counts `amount` into the `Vest` bulk.
    ///
    /// # Errors
    ///
    /// - [`DexError::InvalidConfiguration`] on a non-vesting branch.
    /// - [`DexError::ArithmeticOverflow`] on overflow.
    pub fn record_vested(&mut self, amount: Amount) -> Result<(), DexError> {
        match self {
            Self::OnOn { vest, .. } | Self::OffOn { vest, .. } => vest.add_bulk(amount),
            Self::OffOff { .. } | Self::OnOff { .. } => {
                if amount.is_zero() {
                    Ok(())
                } else {
                    Err(DexError::InvalidConfiguration("branch does not vest"))
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn matrix_matches_option_order() {
        for (i, branch) in Branch::matrix().iter().enumerate() {
            assert_eq!(branch.option().index(), i);
        }
    }

    #[test]
    fn flags() {
        assert!(CollectOption::OnOn.is_compounding() && CollectOption::OnOn.is_vesting());
        assert!(!CollectOption::OffOff.is_compounding() && !CollectOption::OffOff.is_vesting());
        assert!(CollectOption::OffOn.is_vesting() && !CollectOption::OffOn.is_compounding());
    }

    #[test]
    fn sub_pools_follow_the_matrix() {
        let names = |option| -> Vec<SubPoolKind> {
            Branch::empty(option).sub_pools().into_iter().map(|(kind, _)| kind).collect()
        };
        assert_eq!(names(CollectOption::OffOff), vec![SubPoolKind::Accum]);
        assert_eq!(names(CollectOption::OnOff), vec![SubPoolKind::Comp, SubPoolKind::PreComp]);
        assert_eq!(
            names(CollectOption::OnOn),
            vec![SubPoolKind::Comp, SubPoolKind::PreComp, SubPoolKind::Vest]
        );
        assert_eq!(names(CollectOption::OffOn), vec![SubPoolKind::Vest, SubPoolKind::Accum]);
    }

    #[test]
    fn staging_only_where_it_exists() {
        let mut on = Branch::empty(CollectOption::OnOff);
        let Ok(()) = on.shift_staged(Amount::new(5), Amount::ZERO) else {
            panic!("stage");
        };
        assert_eq!(on.staged(), Amount::new(5));
        assert_eq!(
            on.sub_pool(SubPoolKind::PreComp).map(SubPool::bulk),
            Some(Amount::new(5))
        );
        assert_eq!(on.earning_bulk(), Ok(Amount::new(5)));
        let mut off = Branch::empty(CollectOption::OffOff);
        assert!(off.shift_staged(Amount::new(1), Amount::ZERO).is_err());
        assert!(off.record_vested(Amount::new(1)).is_err());
        assert_eq!(off.staged(), Amount::ZERO);
    }

    #[test]
    fn vest_bulk_takes_no_emission() {
        let mut branch = Branch::empty(CollectOption::OffOn);
        let Ok(()) = branch.record_vested(Amount::new(40)) else {
            panic!("vest");
        };
        assert_eq!(branch.vested(), Amount::new(40));
        assert_eq!(branch.earning_bulk(), Ok(Amount::ZERO));
        assert_eq!(branch.earning_mut().len(), 1);
    }
}
