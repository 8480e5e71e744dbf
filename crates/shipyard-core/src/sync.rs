//! Poison-tolerant locking for the call-history and ledger maps.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a `Mutex` even after another holder panicked.
///
/// Every guarded value in this workspace is a plain record (call history,
/// ledger states) that stays consistent between individual inserts.
pub trait LockOrRecover<T> {
    /// Acquires the guard, recovering it from a poisoned lock.
    fn lock_or_recover(&self) -> MutexGuard<'_, T>;
}

impl<T> LockOrRecover<T> for Mutex<T> {
    fn lock_or_recover(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
