use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::error::{ChatError, Result};
use crate::model::SharedFile;
use crate::store::archive;
use crate::store::document::JsonDocument;
use crate::store::lock::DocumentLock;

/// Files users have shared, newest first when listed.
///
/// Listing hides entries whose file has since disappeared but never writes;
/// [`prune`](Self::prune) is the operation that drops them from disk.
#[derive(Debug, Clone)]
pub struct SharedFileRegistry {
    doc: JsonDocument<SharedFile>,
    files: Vec<SharedFile>,
}

impl SharedFileRegistry {
    pub fn open(path: &Path) -> Self {
        Self {
            doc: JsonDocument::new(path),
            files: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.doc.path()
    }

    /// Record that `shared_by` shared `filepath`. The path is stored absolute.
    pub fn add(&mut self, filepath: &Path, shared_by: &str) -> Result<SharedFile> {
        let shared_by = shared_by.trim();
        if shared_by.is_empty() {
            return Err(ChatError::EmptyUsername);
        }
        let absolute = fs::canonicalize(filepath)
            .map_err(|_| ChatError::SharedFileMissing(filepath.display().to_string()))?;
        let filepath = absolute
            .to_str()
            .ok_or_else(|| ChatError::NonUtf8Path(absolute.display().to_string()))?;

        let entry = SharedFile {
            filepath: filepath.to_string(),
            shared_by: shared_by.to_string(),
            timestamp: Local::now(),
        };

        let mut lock = self.doc.lock()?;
        self.files = JsonDocument::read_locked(&mut lock)?;
        self.files.push(entry.clone());
        self.persist_locked(&mut lock);
        info!(file = %entry.filepath, shared_by, "file shared");
        Ok(entry)
    }

    /// Shared files that still exist, newest first.
    pub fn get_all(&mut self) -> Result<Vec<SharedFile>> {
        self.files = self.doc.load()?;
        let mut files: Vec<SharedFile> = self.files.iter().filter(|f| f.exists()).cloned().collect();
        files.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(files)
    }

    /// Remove entries whose file no longer exists. Returns how many were dropped.
    pub fn prune(&mut self) -> Result<usize> {
        let mut lock = self.doc.lock()?;
        self.files = JsonDocument::read_locked(&mut lock)?;
        let before = self.files.len();
        self.files.retain(SharedFile::exists);
        let dropped = before - self.files.len();
        if dropped > 0 {
            self.persist_locked(&mut lock);
            info!(dropped, "pruned missing shared files");
        }
        Ok(dropped)
    }

    /// Move the current list into the archive directory and start empty.
    pub fn archive(&mut self) -> Result<PathBuf> {
        let target = archive::archive_document(self.doc.path())?;
        self.files.clear();
        Ok(target)
    }

    fn persist_locked(&self, lock: &mut DocumentLock) {
        if let Err(e) = JsonDocument::write_locked(lock, &self.files) {
            warn!(path = %lock.path().display(), error = %e, "failed to save shared files");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    fn stored(path: &Path) -> Vec<SharedFile> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn add_stores_absolute_path() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "x").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));

        let entry = registry.add(&file, "alice").unwrap();

        assert!(Path::new(&entry.filepath).is_absolute());
        assert_eq!(Path::new(&entry.filepath), fs::canonicalize(&file).unwrap());
        assert_eq!(entry.shared_by, "alice");
        assert_eq!(stored(registry.path()), vec![entry]);
    }

    #[test]
    fn add_rejects_missing_file() {
        let dir = tempdir().unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));

        let err = registry.add(&dir.path().join("ghost.txt"), "alice").unwrap_err();
        assert!(matches!(err, ChatError::SharedFileMissing(_)));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_path_is_rejected_and_not_stored() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let file = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
        fs::write(&file, "x").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));

        let err = registry.add(&file, "alice").unwrap_err();
        assert!(matches!(err, ChatError::NonUtf8Path(_)));
        assert!(registry.get_all().unwrap().is_empty());
    }

    #[test]
    fn same_file_can_be_shared_twice() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "x").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));

        registry.add(&file, "alice").unwrap();
        registry.add(&file, "bob").unwrap();
        assert_eq!(registry.get_all().unwrap().len(), 2);
    }

    #[test]
    fn get_all_newest_first() {
        let dir = tempdir().unwrap();
        let older = dir.path().join("older.txt");
        let newer = dir.path().join("newer.txt");
        fs::write(&older, "o").unwrap();
        fs::write(&newer, "n").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));

        registry.add(&older, "alice").unwrap();
        thread::sleep(Duration::from_millis(5));
        registry.add(&newer, "bob").unwrap();

        let listed = registry.get_all().unwrap();
        assert_eq!(listed[0].shared_by, "bob");
        assert_eq!(listed[1].shared_by, "alice");
    }

    #[test]
    fn deleted_files_are_hidden_but_not_pruned_by_reads() {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("keep.txt");
        let gone = dir.path().join("gone.txt");
        fs::write(&keep, "k").unwrap();
        fs::write(&gone, "g").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));
        registry.add(&keep, "alice").unwrap();
        registry.add(&gone, "alice").unwrap();

        fs::remove_file(&gone).unwrap();

        let listed = registry.get_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].filepath.ends_with("keep.txt"));
        assert_eq!(stored(registry.path()).len(), 2);
    }

    #[test]
    fn prune_persists_filtered_list() {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("keep.txt");
        let gone = dir.path().join("gone.txt");
        fs::write(&keep, "k").unwrap();
        fs::write(&gone, "g").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));
        registry.add(&keep, "alice").unwrap();
        registry.add(&gone, "bob").unwrap();
        fs::remove_file(&gone).unwrap();

        assert_eq!(registry.prune().unwrap(), 1);
        assert_eq!(stored(registry.path()).len(), 1);
        assert_eq!(registry.prune().unwrap(), 0);
    }

    #[test]
    fn archive_empties_registry() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "x").unwrap();
        let mut registry = SharedFileRegistry::open(&dir.path().join("shared_files.json"));
        registry.add(&file, "alice").unwrap();

        let archived = registry.archive().unwrap();

        let snapshot: Vec<SharedFile> =
            serde_json::from_str(&fs::read_to_string(&archived).unwrap()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(registry.get_all().unwrap().is_empty());
    }
}
