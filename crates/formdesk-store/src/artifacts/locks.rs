//! Per-key timed locks
//!
//! One `parking_lot::Mutex` per artifact key name. Waiting is bounded; an
//! expired wait is reported as storage unavailable instead of blocking the
//! request forever.

#![allow(clippy::result_large_err)]

use crate::errors::{lock_timeout, Result};
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Held for the duration of one read-modify-write on a key
pub type KeyGuard = ArcMutexGuard<RawMutex, ()>;

/// Registry of per-key locks
///
/// Entries are never evicted; the key space is bounded by the projects and
/// periods the access policy lets through.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `name`, waiting at most `timeout`
    pub fn acquire(&self, name: &str, timeout: Duration) -> Result<KeyGuard> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        lock.try_lock_arc_for(timeout)
            .ok_or_else(|| lock_timeout(name, timeout))
    }
}
