//! A monotonically increasing counter persisted in a key-value store.
//!
//! A [`StoredCounter`] owns a single key in a [`Store`] and hands out a
//! gap-free sequence of `u64` values that survives process restarts:
//!
//! - [`StoredCounter::next`] advances the counter and returns the new value.
//! - [`StoredCounter::get`] reads the current value without advancing it.
//! - [`StoredCounter::set`] moves the counter forward to a chosen value.
//!
//! Values are stored as unsigned LEB128 varints, see [`codec`].
//!
//! All operations on one counter are serialized by a lock owned by that
//! counter. Nothing coordinates separate counters (or separate processes)
//! pointed at the same key beyond what the store itself guarantees for a
//! single `get` or `put`.
//!
//! ```
//! use storedcounter::{MemStore, StoredCounter};
//!
//! let store = MemStore::new();
//! let counter = StoredCounter::new(&store, "/sectors/next");
//! assert_eq!(counter.get().unwrap(), 0);
//! assert_eq!(counter.next().unwrap(), 0);
//! assert_eq!(counter.next().unwrap(), 1);
//! counter.set(10).unwrap();
//! assert!(counter.set(3).is_err());
//! assert_eq!(counter.get().unwrap(), 10);
//! ```

#![warn(missing_docs, unreachable_pub)]

pub mod codec;

mod counter;
pub use counter::StoredCounter;

mod error;
pub use error::{Error, Result};

mod store;
pub use store::{FileStore, FileStoreOptions, MemStore, Store};
