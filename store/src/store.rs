//! Generic whole-file JSON array store
//!
//! Each store is a single JSON file holding an array of records. Every access
//! takes an advisory `flock` on the file, and mutation holds the exclusive
//! lock across the full read-modify-write cycle so concurrent writers
//! serialize instead of losing updates.

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::StoreError;

/// A JSON-file store for a list of records of type `T`
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    /// Open a store at the given file path, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "Opened JSON store");
        Ok(Self {
            path,
            _marker: PhantomData,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all records. A missing file reads as an empty list.
    pub fn read_all(&self) -> Result<Vec<T>, StoreError> {
        let file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let result = parse_records(&file, &self.path);
        let _ = file.unlock();
        result
    }

    /// Replace the full contents of the store
    pub fn write_all(&self, records: &[T]) -> Result<(), StoreError> {
        let file = OpenOptions::new().read(true).write(true).create(true).open(&self.path)?;
        file.lock_exclusive()?;
        let result = write_records(&file, records);
        let _ = file.unlock();
        result
    }

    /// Apply a mutation under the exclusive lock
    ///
    /// The closure sees the current records and may change them freely; the
    /// result is written back before the lock is released. Returns whatever
    /// the closure returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, StoreError> {
        let file = OpenOptions::new().read(true).write(true).create(true).open(&self.path)?;
        file.lock_exclusive()?;
        let result = (|| {
            let mut records = parse_records(&file, &self.path)?;
            let out = f(&mut records);
            write_records(&file, &records)?;
            Ok(out)
        })();
        let _ = file.unlock();
        result
    }
}

/// Parse the store file, treating corruption as an empty store
///
/// A corrupt file is logged and read as empty rather than failing every
/// subsequent operation; the next successful write replaces it.
fn parse_records<T: DeserializeOwned>(mut file: &File, path: &Path) -> Result<Vec<T>, StoreError> {
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str(&content) {
        Ok(records) => Ok(records),
        Err(e) => {
            error!(path = %path.display(), %e, "Store file is corrupt, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn write_records<T: Serialize>(mut file: &File, records: &[T]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records).map_err(StoreError::Serialize)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
