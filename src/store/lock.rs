use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::{ChatError, Result};

/// Exclusive advisory lock over a whole JSON document.
///
/// The handle stays open for as long as the lock is held, so callers read and
/// rewrite the document through it. Dropping the value unlocks and closes the
/// file on every exit path.
#[derive(Debug)]
pub struct DocumentLock {
    file: File,
    path: PathBuf,
}

impl DocumentLock {
    /// Block until the document at `path` is exclusively ours.
    ///
    /// Missing parent directories are created first; a missing or zero-length
    /// document is seeded with `[]` once the lock is held.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = open_document(path)?;
        debug!(path = %path.display(), "waiting for document lock");
        file.lock_exclusive()?;
        Self::locked(file, path)
    }

    /// Like [`acquire`](Self::acquire) but returns `None` instead of waiting
    /// when another handle already holds the lock.
    #[cfg(test)]
    pub(crate) fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let file = open_document(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Self::locked(file, path).map(Some),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn locked(file: File, path: &Path) -> Result<Self> {
        let mut lock = Self {
            file,
            path: path.to_path_buf(),
        };
        if lock.file.metadata()?.len() == 0 {
            lock.rewrite(b"[]")?;
        }
        lock.file.seek(SeekFrom::Start(0))?;
        debug!(path = %path.display(), "document lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document from the start.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut content = Vec::new();
        self.file.read_to_end(&mut content)?;
        Ok(content)
    }

    /// Truncate the document and write `contents` in its place.
    pub fn rewrite(&mut self, contents: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.file.write_all(contents)?;
        self.file.flush()?;
        self.file.seek(SeekFrom::Start(0))?;
        Ok(())
    }
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "unlock failed; closing handle");
        }
    }
}

fn open_document(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ChatError::Setup {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn acquire_creates_directory_and_seeds_empty_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        let mut lock = DocumentLock::acquire(&path).unwrap();
        assert_eq!(lock.read_all().unwrap(), b"[]");
        drop(lock);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn existing_content_is_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"["alice"]"#).unwrap();

        let mut lock = DocumentLock::acquire(&path).unwrap();
        assert_eq!(lock.read_all().unwrap(), br#"["alice"]"#);
    }

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let held = DocumentLock::acquire(&path).unwrap();
        assert!(DocumentLock::try_acquire(&path).unwrap().is_none());
        drop(held);
        assert!(DocumentLock::try_acquire(&path).unwrap().is_some());
    }

    #[test]
    fn acquire_blocks_while_another_handle_holds_the_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        let mut held = DocumentLock::acquire(&path).unwrap();
        let (tx, rx) = mpsc::channel();
        let waiter_path = path.clone();
        let waiter = thread::spawn(move || {
            let mut lock = DocumentLock::acquire(&waiter_path).unwrap();
            tx.send(lock.read_all().unwrap()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
        held.rewrite(br#"["written-while-held"]"#).unwrap();
        drop(held);

        let seen = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(seen, br#"["written-while-held"]"#);
        waiter.join().unwrap();
    }

    #[test]
    fn rewrite_truncates_longer_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"["a-very-long-name","another-long-name"]"#).unwrap();

        let mut lock = DocumentLock::acquire(&path).unwrap();
        lock.rewrite(b"[]").unwrap();
        assert_eq!(lock.read_all().unwrap(), b"[]");
    }

    #[test]
    fn unwritable_parent_is_a_setup_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = DocumentLock::acquire(&blocker.join("doc.json")).unwrap_err();
        assert!(matches!(err, ChatError::Setup { .. }));
    }
}
