//! Process-local key-value store.

use super::{KvError, KvResult, KvStore};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// `HashMap`-backed store. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Inspection helpers read through a poisoned lock: a panicking writer
    // leaves the map intact, and tests need to see what it left behind.

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inspect().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inspect().contains_key(key)
    }

    /// Sorted snapshot of all keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inspect().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }

    fn inspect(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> KvResult<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.entries
            .read()
            .map_err(|_| KvError::Backend("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> KvResult<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.entries
            .write()
            .map_err(|_| KvError::Backend("memory store lock poisoned".to_string()))
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: String) -> KvResult<()> {
        self.write()?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        self.write()?.remove(key);
        Ok(())
    }
}
