use std::collections::BTreeSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{ChatError, Result};
use crate::store::document::JsonDocument;
use crate::store::lock::DocumentLock;

/// The set of users currently logged in on this machine.
///
/// The document on disk is the authority. Every operation re-reads it under
/// the document lock before deciding anything, and the in-memory set is only
/// a cache of the last state this process saw or wrote.
#[derive(Debug, Clone)]
pub struct PresenceRegistry {
    doc: JsonDocument<String>,
    users: BTreeSet<String>,
}

impl PresenceRegistry {
    pub fn open(path: &Path) -> Self {
        Self {
            doc: JsonDocument::new(path),
            users: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.doc.path()
    }

    /// Register `username`. The saved set is the fresh disk state plus the new
    /// name, so users other processes added in the meantime are kept.
    pub fn add(&mut self, username: &str) -> Result<()> {
        let name = username.trim();
        if name.is_empty() {
            return Err(ChatError::EmptyUsername);
        }

        let mut lock = self.doc.lock()?;
        let on_disk = read_set(&mut lock)?;
        if on_disk.contains(name) {
            self.users = on_disk;
            return Err(ChatError::DuplicateUser(name.to_string()));
        }

        self.users = on_disk;
        self.users.insert(name.to_string());
        self.persist_locked(&mut lock);
        info!(user = name, "user joined");
        Ok(())
    }

    /// Drop `username` from the set as it currently stands on disk.
    pub fn remove(&mut self, username: &str) -> Result<()> {
        let name = username.trim();
        let mut lock = self.doc.lock()?;
        let mut on_disk = read_set(&mut lock)?;
        if !on_disk.remove(name) {
            self.users = on_disk;
            return Err(ChatError::UserNotFound(name.to_string()));
        }

        self.users = on_disk;
        self.persist_locked(&mut lock);
        info!(user = name, "user left");
        Ok(())
    }

    /// Every active user, alphabetically.
    pub fn get_all(&mut self) -> Result<Vec<String>> {
        self.users = self.doc.load()?.into_iter().collect();
        Ok(self.users.iter().cloned().collect())
    }

    /// Log everybody out, whatever other processes think.
    pub fn clear_all(&mut self) -> Result<()> {
        let mut lock = self.doc.lock()?;
        self.users.clear();
        self.persist_locked(&mut lock);
        info!("all users cleared");
        Ok(())
    }

    fn persist_locked(&self, lock: &mut DocumentLock) {
        let users: Vec<String> = self.users.iter().cloned().collect();
        if let Err(e) = JsonDocument::write_locked(lock, &users) {
            warn!(path = %lock.path().display(), error = %e, "failed to save active users");
        }
    }
}

fn read_set(lock: &mut DocumentLock) -> Result<BTreeSet<String>> {
    Ok(JsonDocument::<String>::read_locked(lock)?
        .into_iter()
        .collect())
}
