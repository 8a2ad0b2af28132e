//! One-shot operations on a file-backed counter.

use std::path::PathBuf;

use clap::Parser;
use log::debug;
use storedcounter::{FileStore, FileStoreOptions, StoredCounter};

use crate::Result;

#[derive(Parser, Debug, Clone)]
#[clap(about = "Operate on a counter stored in a directory")]
pub(crate) struct CounterArgs {
    /// Sets the directory of the file store
    #[clap(long, required = true)]
    dir: PathBuf,

    /// Sets the key of the counter
    #[clap(long, default_value = "/counter")]
    key: String,

    /// Skips fsync after each write
    #[clap(long, default_value_t = false)]
    no_sync: bool,
}

#[derive(Parser, Debug, Clone)]
#[clap(about = "Move a counter forward to a value")]
pub(crate) struct SetArgs {
    #[clap(flatten)]
    counter: CounterArgs,

    /// The value to set, must not be less than the current one
    number: u64,
}

impl CounterArgs {
    pub(crate) fn open(&self) -> Result<StoredCounter<FileStore>> {
        let options = FileStoreOptions {
            sync: !self.no_sync,
        };
        let store = FileStore::open(&self.dir, options)?;
        debug!("Open counter {} in {}", self.key, self.dir.display());
        Ok(StoredCounter::new(store, self.key.as_str()))
    }
}

pub(crate) fn next(args: &CounterArgs) -> Result<u64> {
    Ok(args.open()?.next()?)
}

pub(crate) fn get(args: &CounterArgs) -> Result<u64> {
    Ok(args.open()?.get()?)
}

pub(crate) fn set(args: &SetArgs) -> Result<()> {
    args.counter.open()?.set(args.number)?;
    Ok(())
}
