//! Cooperative reentrancy guard.

use tracing::warn;

use crate::error::DexError;

/// A lock flag held for the duration of a balance-affecting call.
///
/// Execution is single-threaded, so the guard only has to catch a call
/// re-entering the same resource before the outer call has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReentrancyGuard {
    resource: &'static str,
    locked: bool,
}

impl ReentrancyGuard {
    /// Creates an unlocked guard for `resource`.
    #[must_use]
    pub const fn new(resource: &'static str) -> Self {
        Self {
            resource,
            locked: false,
        }
    }

    /// Acquires the lock.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Reentrancy`] if already held.
    pub fn enter(&mut self) -> Result<(), DexError> {
        if self.locked {
            warn!(resource = self.resource, "reentrant call rejected");
            return Err(DexError::Reentrancy(self.resource));
        }
        self.locked = true;
        Ok(())
    }

    /// Releases the lock.
    pub fn exit(&mut self) {
        self.locked = false;
    }

    /// Returns `true` while held.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Runs `f` with the lock held, releasing it on both success and error.
    ///
    /// # Errors
    ///
    /// Returns [`DexError::Reentrancy`] if already held, otherwise whatever
    /// `f` returns.
    pub fn run<T, S>(
        state: &mut S,
        guard: fn(&mut S) -> &mut Self,
        f: impl FnOnce(&mut S) -> Result<T, DexError>,
    ) -> Result<T, DexError> {
        guard(state).enter()?;
        let out = f(state);
        guard(state).exit();
        out
    }
}
