use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::{ChatError, Result};
use crate::store::lock::DocumentLock;

pub const ARCHIVE_DIR: &str = "archives";

/// Snapshot a document into `archives/<stem>_<YYYYMMDD_HHMMSS>.json` next to
/// it, then reset the live document to `[]`.
///
/// The document lock is held across both steps. If the copy cannot be
/// written the live document is not touched. A failure while clearing leaves
/// the data in both places, never in neither.
pub fn archive_document(source: &Path) -> Result<PathBuf> {
    let mut lock = DocumentLock::acquire(source).map_err(|e| with_archive_path(source, e))?;
    let contents = lock.read_all().map_err(|e| with_archive_path(source, e))?;

    let dir = archive_dir(source);
    fs::create_dir_all(&dir).map_err(|e| archive_error(&dir, e))?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let target = write_new_archive(&dir, stem, &stamp, &contents)?;

    lock.rewrite(b"[]").map_err(|e| with_archive_path(source, e))?;

    info!(
        source = %source.display(),
        archive = %target.display(),
        bytes = contents.len(),
        "document archived"
    );
    Ok(target)
}

/// Directory holding archives for the document at `source`.
pub fn archive_dir(source: &Path) -> PathBuf {
    source
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(ARCHIVE_DIR)
}

fn write_new_archive(dir: &Path, stem: &str, stamp: &str, contents: &[u8]) -> Result<PathBuf> {
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            format!("{stem}_{stamp}.json")
        } else {
            format!("{stem}_{stamp}_{suffix}.json")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let written = file.write_all(contents).and_then(|()| file.sync_all());
                if let Err(e) = written {
                    let _ = fs::remove_file(&path);
                    return Err(archive_error(&path, e));
                }
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(archive_error(&path, e)),
        }
    }
}

fn with_archive_path(path: &Path, err: ChatError) -> ChatError {
    match err {
        ChatError::Io(cause) => archive_error(path, cause),
        other => other,
    }
}

fn archive_error(path: &Path, source: io::Error) -> ChatError {
    ChatError::ArchiveIo {
        path: path.to_path_buf(),
        source,
    }
}
