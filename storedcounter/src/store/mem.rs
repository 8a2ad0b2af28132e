use std::collections::HashMap;

use parking_lot::RwLock;

use super::Store;
use crate::{Error, Result};

/// An in-memory [`Store`].
///
/// Values live as long as the store does, so this is only "persistent" for
/// counters that are recreated over the same `MemStore`.
#[derive(Debug, Default)]
pub struct MemStore {
    map: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys in the store.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Returns true if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl Store for MemStore {
    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.map.read().contains_key(key))
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.map.read().get(key).cloned().ok_or(Error::NotFound)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crud() {
        let store = MemStore::new();
        assert!(store.is_empty());
        assert!(matches!(store.get(b"a"), Err(Error::NotFound)));
        store.put(b"a", &[1]).unwrap();
        store.put(b"a", &[2, 3]).unwrap();
        store.put(b"b", &[]).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b"a").unwrap(), [2, 3]);
        assert!(store.has(b"b").unwrap());
        assert!(store.get(b"b").unwrap().is_empty());
    }
}
