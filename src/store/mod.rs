pub mod archive;
pub mod document;
pub mod lock;
pub mod messages;
pub mod presence;
pub mod shared_files;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::store::lock::DocumentLock;
use crate::store::messages::MessageLog;
use crate::store::presence::PresenceRegistry;
use crate::store::shared_files::SharedFileRegistry;

/// The three shared documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Messages,
    Users,
    SharedFiles,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::Messages, Self::Users, Self::SharedFiles];
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Messages => write!(f, "messages"),
            Self::Users => write!(f, "users"),
            Self::SharedFiles => write!(f, "shared_files"),
        }
    }
}

/// Everything one client process knows about the shared state.
///
/// Owned by whoever composes the process (the CLI, a UI shell, a test) and
/// passed by reference; cloning gives an independent handle over the same
/// documents.
#[derive(Debug, Clone)]
pub struct ChatStore {
    data_dir: PathBuf,
    pub presence: PresenceRegistry,
    pub messages: MessageLog,
    pub shared_files: SharedFileRegistry,
}

impl ChatStore {
    /// Open the store, creating the data directory and empty documents as needed.
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir).map_err(|source| ChatError::Setup {
            path: config.data_dir.clone(),
            source,
        })?;

        let store = Self {
            data_dir: config.data_dir.clone(),
            presence: PresenceRegistry::open(&config.users_path()),
            messages: MessageLog::open(&config.history_path()),
            shared_files: SharedFileRegistry::open(&config.files_path()),
        };

        for kind in DocumentKind::ALL {
            let path = store.document_path(kind);
            DocumentLock::acquire(path).map_err(|e| match e {
                ChatError::Io(source) => ChatError::Setup {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })?;
        }
        debug!(data_dir = %store.data_dir.display(), "chat store ready");
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn document_path(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Messages => self.messages.path(),
            DocumentKind::Users => self.presence.path(),
            DocumentKind::SharedFiles => self.shared_files.path(),
        }
    }
}
