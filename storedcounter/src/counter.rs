use log::{debug, trace};
use parking_lot::Mutex;

use crate::{codec, Error, Result, Store};

/// A counter that persists to a [`Store`] as it increments.
///
/// The counter owns a single key. A missing key means the counter has never
/// been advanced and reads as `0`; the key is written on the first call to
/// [`next`](Self::next) or [`set`](Self::set).
///
/// Operations on the same counter are serialized by a lock that belongs to
/// the counter, so counters over different keys never contend. Two counters
/// over the same key (in one process or several) are not coordinated.
///
/// Stored bytes are decoded leniently, see [`codec::decode`]: a corrupted
/// value reads as `0` and the next call to `next` writes `1`.
#[derive(Debug)]
pub struct StoredCounter<S> {
    store: S,
    key: Vec<u8>,
    lock: Mutex<()>,
}

impl<S: Store> StoredCounter<S> {
    /// Creates a counter over the key of the store.
    ///
    /// This performs no I/O. The store is not closed when the counter is
    /// dropped; pass a reference or an `Arc` to share it.
    pub fn new(store: S, key: impl Into<Vec<u8>>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the key this counter persists to.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Advances the counter and returns the new value.
    ///
    /// The first call on a fresh key returns `0`. Each call writes the
    /// returned value before returning it.
    pub fn next(&self) -> Result<u64> {
        let _guard = self.lock.lock();
        let next = match self.load()? {
            Some(cur) => cur.wrapping_add(1),
            None => 0,
        };
        self.store.put(&self.key, &codec::encode(next))?;
        trace!("counter {:?} advanced to {next}", self.key);
        Ok(next)
    }

    /// Returns the current value, or `0` if the counter has never been
    /// written.
    pub fn get(&self) -> Result<u64> {
        let _guard = self.lock.lock();
        Ok(self.load()?.unwrap_or(0))
    }

    /// Sets the counter to `number`.
    ///
    /// Setting the current value again or jumping forward is allowed. Moving
    /// backward fails with [`Error::Backward`] and writes nothing.
    pub fn set(&self, number: u64) -> Result<()> {
        let _guard = self.lock.lock();
        if let Some(current) = self.load()? {
            if current > number {
                debug!(
                    "counter {:?} refused to move from {current} back to {number}",
                    self.key
                );
                return Err(Error::Backward {
                    requested: number,
                    current,
                });
            }
        }
        self.store.put(&self.key, &codec::encode(number))?;
        trace!("counter {:?} set to {number}", self.key);
        Ok(())
    }

    /// Reads the persisted value, `None` if the key is absent.
    ///
    /// Must be called with the lock held.
    fn load(&self) -> Result<Option<u64>> {
        if !self.store.has(&self.key)? {
            return Ok(None);
        }
        let buf = self.store.get(&self.key)?;
        Ok(Some(codec::decode(&buf)))
    }
}
