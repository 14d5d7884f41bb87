//! Per-row serialization
//!
//! Every read-modify-write on a ledger row runs inside [`RowLocks::with`]
//! for that row's key, so a regenerate-check-deduct sequence for one player
//! can never interleave with another on the same account. Rows of different
//! entities proceed in parallel.

use crate::{PlanetId, PlayerId, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Identifies a lockable ledger row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// A player's turn account
    Turns(PlayerId),
    /// All reputation records of a player (propagation touches several)
    Reputation(PlayerId),
    Planet(PlanetId),
}

/// A table of row mutexes created on demand
#[derive(Debug, Default)]
pub struct RowLocks {
    rows: Mutex<HashMap<RowKey, Arc<Mutex<()>>>>,
}

impl RowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`
    pub fn with<T>(&self, key: RowKey, f: impl FnOnce() -> Result<T>) -> Result<T> {
        loop {
            let row = {
                let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(rows.entry(key).or_default())
            };
            // The guarded data is `()`, so a poisoned row is still usable.
            let guard = row.lock().unwrap_or_else(PoisonError::into_inner);
            // A row forgotten while we waited is stale; take the current one.
            let current = self
                .rows
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&key)
                .is_some_and(|r| Arc::ptr_eq(r, &row));
            if current {
                let result = f();
                drop(guard);
                return result;
            }
        }
    }

    /// Drop the mutex of a row that no longer exists
    ///
    /// Must be called from inside [`RowLocks::with`] for the same key, so
    /// that waiters on the old mutex see it is gone and retry.
    pub fn forget(&self, key: RowKey) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }

    /// Number of rows with a lock allocated
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
