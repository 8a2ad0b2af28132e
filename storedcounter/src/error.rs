use thiserror::Error;

/// A list of possible errors returned by a counter or a store.
#[derive(Error, Debug)]
pub enum Error {
    /// The store failed to perform I/O.
    #[error("IO {0}")]
    Io(#[from] std::io::Error),
    /// The key does not exist in the store.
    #[error("NotFound")]
    NotFound,
    /// A caller-supplied store failed.
    #[error("Store {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),
    /// Refused to move the counter backward.
    #[error("Number {requested} should not be less than current value {current}")]
    Backward {
        /// The value passed to `set`.
        requested: u64,
        /// The value persisted at the time of the call.
        current: u64,
    },
}

impl Error {
    /// Wraps an arbitrary error raised by a [`Store`](crate::Store)
    /// implementation.
    pub fn store<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Store(err.into())
    }
}

/// A specialized [`Result`] type returned by storedcounter.
pub type Result<T, E = Error> = std::result::Result<T, E>;
