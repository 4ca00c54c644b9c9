//! Reentrancy guard for the swap entrypoints.
//!
//! Routers are untrusted programs invoked mid-swap. The lock is raised before
//! anything else happens and cleared only after settlement, so a router that
//! calls back into `swap`/`cross_dex_swap` fails with `ReentrantCall`.

use anchor_lang::prelude::*;

use crate::error::RouterError;

pub trait ReentrancyLock {
    fn is_locked(&self) -> Result<bool>;
    fn set_locked(&mut self, locked: bool) -> Result<()>;
}

/// Runs `f` with the lock held.
///
/// A failed body leaves the flag cleared as well; on-chain the whole
/// transaction is rolled back anyway.
pub fn non_reentrant<L, T, F>(lock: &mut L, f: F) -> Result<T>
where
    L: ReentrancyLock + ?Sized,
    F: FnOnce(&mut L) -> Result<T>,
{
    require!(!lock.is_locked()?, RouterError::ReentrantCall);
    lock.set_locked(true)?;
    let outcome = f(lock);
    lock.set_locked(false)?;
    outcome
}
