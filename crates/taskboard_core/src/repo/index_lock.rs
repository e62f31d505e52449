//! Per-index single-writer coordination.
//!
//! The key-value primitive has no compare-and-swap, so two read-modify-write
//! cycles on the same index key would race and drop one append. Every index
//! rewrite in this process holds the slot for its key from read to write.
//! Writers in other processes are not covered.
//!
//! Slots are dropped once no caller holds a clone, so the registry stays
//! bounded by the number of indexes in use rather than ever created.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub(crate) struct IndexLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IndexLocks {
    /// Returns the lock slot for `index_key`, creating it on first use.
    ///
    /// A slot whose only reference is the registry is neither held nor
    /// awaited, so it is pruned here.
    pub(crate) fn slot(&self, index_key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|key, slot| key == index_key || Arc::strong_count(slot) > 1);
        Arc::clone(slots.entry(index_key.to_string()).or_default())
    }

    /// Number of registered slots.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Locks a slot. A poisoned slot guards no data, so it is recovered.
pub(crate) fn hold(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
