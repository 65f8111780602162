//! Poison-tolerant locking for the adapter's shared state.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, taking the guard back from a poisoned lock.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
