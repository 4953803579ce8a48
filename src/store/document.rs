use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Result;
use crate::store::lock::DocumentLock;

/// A flat JSON array on disk holding the full state of one collection.
///
/// Every access goes through a [`DocumentLock`]. Callers that need a
/// read-modify-write cycle take the lock once with [`lock`](Self::lock) and
/// use [`read_locked`](Self::read_locked) / [`write_locked`](Self::write_locked)
/// so the whole sequence is covered.
#[derive(Debug)]
pub struct JsonDocument<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonDocument<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> JsonDocument<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock(&self) -> Result<DocumentLock> {
        DocumentLock::acquire(&self.path)
    }
}

impl<T: Serialize + DeserializeOwned> JsonDocument<T> {
    /// Load every record. A malformed document loads as empty.
    pub fn load(&self) -> Result<Vec<T>> {
        let mut lock = self.lock()?;
        Self::read_locked(&mut lock)
    }

    /// Replace the document with `records`.
    pub fn save(&self, records: &[T]) -> Result<()> {
        let mut lock = self.lock()?;
        Self::write_locked(&mut lock, records)
    }

    pub fn read_locked(lock: &mut DocumentLock) -> Result<Vec<T>> {
        let content = lock.read_all()?;
        match serde_json::from_slice(&content) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    path = %lock.path().display(),
                    error = %e,
                    "document is not a valid record array; treating it as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    pub fn write_locked(lock: &mut DocumentLock, records: &[T]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        lock.rewrite(&json)
    }
}
