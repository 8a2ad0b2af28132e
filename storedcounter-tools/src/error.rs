use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("Counter {0}")]
    Counter(#[from] storedcounter::Error),
    #[error("Histogram {0}")]
    Histogram(#[from] hdrhistogram::CreationError),
    #[error("Verify {0}")]
    Verify(String),
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;
