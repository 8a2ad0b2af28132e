use storedcounter::{FileStore, FileStoreOptions, Result, StoredCounter};
use tempfile::tempdir;

fn main() -> Result<()> {
    env_logger::init();
    let path = tempdir()?;
    {
        let store = FileStore::open(&path, FileStoreOptions::default())?;
        let counter = StoredCounter::new(store, "/sectors/next");
        assert_eq!(counter.next()?, 0);
        assert_eq!(counter.next()?, 1);
    }
    // The value survives reopening the store.
    let store = FileStore::open(&path, FileStoreOptions::default())?;
    let counter = StoredCounter::new(store, "/sectors/next");
    assert_eq!(counter.get()?, 1);
    counter.set(100)?;
    if let Err(err) = counter.set(50) {
        println!("{err}");
    }
    println!("next sector: {}", counter.next()?);
    Ok(())
}
