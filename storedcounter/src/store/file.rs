use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use log::{debug, info};
use sha2::{Digest, Sha256};

use super::Store;
use crate::{Error, Result};

/// Options to configure a [`FileStore`].
#[derive(Clone, Debug)]
pub struct Options {
    /// If true, fsync each value and its directory before `put` returns.
    ///
    /// Without it a value may be lost on power failure, but a write is still
    /// never torn: readers see either the old or the new bytes.
    ///
    /// Default: true
    pub sync: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { sync: true }
    }
}

/// Keys up to this many bytes are named by their full hex.
const MAX_HEX_KEY_LEN: usize = 64;

/// A [`Store`] that keeps one file per key in a directory.
///
/// A key maps to a file named after the lowercase hex of its bytes. Keys
/// longer than 64 bytes are named by the hex of their first 32 bytes, a `-`,
/// and the hex SHA-256 of the whole key, so names stay well below file system
/// limits.
///
/// Values are written to a temporary file first and renamed into place. Temp
/// files left by a crashed process are removed when the store is opened; do
/// not share a directory between live processes.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    options: Options,
    next_tmp_id: AtomicU64,
}

impl FileStore {
    /// Opens a store in the directory, creating it if it does not exist.
    pub fn open<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("Open file store {} with {options:?}", dir.display());
        let store = Self {
            dir,
            options,
            next_tmp_id: AtomicU64::new(0),
        };
        store.clean_tmp_files()?;
        Ok(store)
    }

    /// Returns the directory of the store.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &[u8]) -> PathBuf {
        self.dir.join(format!("{}.val", file_stem(key)))
    }

    fn tmp_path(&self, key: &[u8]) -> PathBuf {
        let id = self.next_tmp_id.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{}.{}.{id}.tmp", file_stem(key), std::process::id()))
    }

    /// Removes temp files written by other processes.
    fn clean_tmp_files(&self) -> Result<()> {
        let pid = std::process::id();
        let mut obsoleted_files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if tmp_file_pid(name).map_or(false, |p| p != pid) {
                fs::remove_file(entry.path())?;
                obsoleted_files.push(name.to_owned());
            }
        }
        if !obsoleted_files.is_empty() {
            info!("Clean obsoleted files {obsoleted_files:?}");
        }
        Ok(())
    }

    #[cfg(unix)]
    fn sync_dir(&self) -> Result<()> {
        File::open(&self.dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> Result<()> {
        Ok(())
    }
}

impl Store for FileStore {
    fn has(&self, key: &[u8]) -> Result<bool> {
        match fs::metadata(self.value_path(key)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        match fs::read(self.value_path(key)) {
            Ok(value) => Ok(value),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(Error::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let tmp = self.tmp_path(key);
        let written = (|| -> Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(value)?;
            if self.options.sync {
                file.sync_all()?;
            }
            fs::rename(&tmp, self.value_path(key))?;
            Ok(())
        })();
        if written.is_err() {
            // Report the write error, not the cleanup one.
            let _ = fs::remove_file(&tmp);
            return written;
        }
        if self.options.sync {
            self.sync_dir()?;
        }
        Ok(())
    }
}

fn file_stem(key: &[u8]) -> String {
    if key.len() <= MAX_HEX_KEY_LEN {
        return hex(key);
    }
    let digest = Sha256::digest(key);
    format!("{}-{}", hex(&key[..MAX_HEX_KEY_LEN / 2]), hex(&digest))
}

/// Returns the writer pid if `name` is a temp file name.
fn tmp_file_pid(name: &str) -> Option<u32> {
    let mut parts = name.rsplitn(4, '.');
    if parts.next()? != "tmp" {
        return None;
    }
    let _id: u64 = parts.next()?.parse().ok()?;
    let pid = parts.next()?.parse().ok()?;
    parts.next()?;
    Some(pid)
}

fn hex(key: &[u8]) -> String {
    let mut s = String::with_capacity(key.len() * 2);
    for b in key {
        let _ = write!(s, "{b:02x}");
    }
    s
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn crud() {
        let path = tempdir().unwrap();
        let store = FileStore::open(path.path(), Options::default()).unwrap();
        assert!(!store.has(b"/a").unwrap());
        assert!(matches!(store.get(b"/a"), Err(Error::NotFound)));
        store.put(b"/a", &[1]).unwrap();
        store.put(b"/a", &[2, 3]).unwrap();
        assert!(store.has(b"/a").unwrap());
        assert_eq!(store.get(b"/a").unwrap(), [2, 3]);

        // The empty key is a key like any other.
        store.put(b"", &[4]).unwrap();
        assert_eq!(store.get(b"").unwrap(), [4]);

        // No temporary files are left behind.
        let names: Vec<_> = fs::read_dir(path.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.ends_with(".val")));
    }

    #[test]
    fn reopen() {
        let path = tempdir().unwrap();
        let options = Options { sync: false };
        {
            let store = FileStore::open(path.path(), options.clone()).unwrap();
            store.put(b"counter", b"value").unwrap();
        }
        let store = FileStore::open(path.path(), options).unwrap();
        assert_eq!(store.get(b"counter").unwrap(), b"value");
    }

    #[test]
    fn open_creates_dir() {
        let path = tempdir().unwrap();
        let dir = path.path().join("nested").join("store");
        let store = FileStore::open(&dir, Options::default()).unwrap();
        assert_eq!(store.path(), dir);
        assert!(dir.is_dir());
    }

    #[test]
    fn hex_names() {
        assert_eq!(hex(b""), "");
        assert_eq!(hex(&[0x00, 0x0f, 0xab]), "000fab");
        assert_eq!(file_stem(&[0xab; 64]), "ab".repeat(64));
    }

    #[test]
    fn long_keys() {
        let path = tempdir().unwrap();
        let store = FileStore::open(path.path(), Options { sync: false }).unwrap();
        let a = vec![b'k'; 256];
        let mut b = a.clone();
        b[255] = b'j';
        assert!(!store.has(&a).unwrap());
        assert!(matches!(store.get(&a), Err(Error::NotFound)));
        store.put(&a, &[1]).unwrap();
        store.put(&b, &[2]).unwrap();
        assert_eq!(store.get(&a).unwrap(), [1]);
        assert_eq!(store.get(&b).unwrap(), [2]);

        // Keys sharing a long prefix still get distinct, bounded names.
        let (sa, sb) = (file_stem(&a), file_stem(&b));
        assert_ne!(sa, sb);
        assert_eq!(sa.len(), 64 + 1 + 64);
        assert!(sa.starts_with(&hex(&a[..32])));

        let counter = crate::StoredCounter::new(&store, vec![b'c'; 200]);
        assert_eq!(counter.get().unwrap(), 0);
        assert_eq!(counter.next().unwrap(), 0);
        assert_eq!(counter.next().unwrap(), 1);
    }

    #[test]
    fn clean_tmp_files_on_open() {
        let path = tempdir().unwrap();
        let pid = std::process::id();
        let stale = format!("6b.{}.0.tmp", pid.wrapping_add(1));
        let live = format!("6b.{pid}.0.tmp");
        {
            let store = FileStore::open(path.path(), Options { sync: false }).unwrap();
            store.put(b"k", &[7]).unwrap();
        }
        fs::write(path.path().join(&stale), [1]).unwrap();
        fs::write(path.path().join(&live), [1]).unwrap();

        let store = FileStore::open(path.path(), Options { sync: false }).unwrap();
        assert!(!path.path().join(&stale).exists());
        assert!(path.path().join(&live).exists());
        assert_eq!(store.get(b"k").unwrap(), [7]);
    }

    #[test]
    fn parse_tmp_file_pid() {
        assert_eq!(tmp_file_pid("6b.42.7.tmp"), Some(42));
        assert_eq!(tmp_file_pid(".42.7.tmp"), Some(42));
        assert_eq!(tmp_file_pid("6b.val"), None);
        assert_eq!(tmp_file_pid("42.7.tmp"), None);
        assert_eq!(tmp_file_pid("6b.x.7.tmp"), None);
    }
}
