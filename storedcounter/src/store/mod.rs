//! Key-value stores a counter can persist to.

use std::sync::Arc;

use crate::Result;

mod file;
pub use file::{FileStore, Options as FileStoreOptions};

mod mem;
pub use mem::MemStore;

/// A persistent mapping from byte-string keys to byte-string values.
///
/// Implementations are responsible for their own durability. A single `get`
/// or `put` is expected to be atomic; nothing larger is.
pub trait Store: Send + Sync {
    /// Returns true if the key exists.
    fn has(&self, key: &[u8]) -> Result<bool>;

    /// Gets the value corresponding to the key.
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the key does not
    /// exist.
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Puts a key-value entry, replacing any previous value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
}

impl<S: Store + ?Sized> Store for &S {
    fn has(&self, key: &[u8]) -> Result<bool> {
        (**self).has(key)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn has(&self, key: &[u8]) -> Result<bool> {
        (**self).has(key)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn has(&self, key: &[u8]) -> Result<bool> {
        (**self).has(key)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}
