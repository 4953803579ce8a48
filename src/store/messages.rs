use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::error::{ChatError, Result};
use crate::model::{GIF_PREFIX, Message};
use crate::store::archive;
use crate::store::document::JsonDocument;

/// Chronological chat log, rewritten in full on every append.
#[derive(Debug, Clone)]
pub struct MessageLog {
    doc: JsonDocument<Message>,
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn open(path: &Path) -> Self {
        Self {
            doc: JsonDocument::new(path),
            messages: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.doc.path()
    }

    /// Append one message and save the whole log.
    ///
    /// Content of the form `GIF: <path>` is only accepted when `<path>`
    /// exists on this machine.
    pub fn append(
        &mut self,
        sender: &str,
        content: &str,
        timestamp: DateTime<Local>,
    ) -> Result<Message> {
        let sender = sender.trim();
        if sender.is_empty() {
            return Err(ChatError::EmptyUsername);
        }
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if let Some(gif) = content.strip_prefix(GIF_PREFIX)
            && !Path::new(gif.trim()).exists()
        {
            return Err(ChatError::GifNotFound(gif.trim().to_string()));
        }

        let message = Message::new(sender, content, timestamp);

        let mut lock = self.doc.lock()?;
        self.messages = JsonDocument::read_locked(&mut lock)?;
        self.messages.push(message.clone());
        if let Err(e) = JsonDocument::write_locked(&mut lock, &self.messages) {
            warn!(path = %lock.path().display(), error = %e, "failed to save chat history");
        }
        info!(sender, "message appended");
        Ok(message)
    }

    /// Every message, oldest first.
    pub fn get_all(&mut self) -> Result<Vec<Message>> {
        self.messages = self.doc.load()?;
        let mut messages = self.messages.clone();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    /// Move the current log into the archive directory and start empty.
    pub fn archive(&mut self) -> Result<PathBuf> {
        let target = archive::archive_document(self.doc.path())?;
        self.messages.clear();
        Ok(target)
    }
}
