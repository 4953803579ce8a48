use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MIN_POLL_INTERVAL;
use crate::error::Result;
use crate::model::{Message, SharedFile};
use crate::store::{ChatStore, DocumentKind};

/// Fresh contents of a document some process just wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "document", content = "items", rename_all = "snake_case")]
pub enum ChangeEvent {
    Messages(Vec<Message>),
    Users(Vec<String>),
    SharedFiles(Vec<SharedFile>),
}

impl ChangeEvent {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Messages(_) => DocumentKind::Messages,
            Self::Users(_) => DocumentKind::Users,
            Self::SharedFiles(_) => DocumentKind::SharedFiles,
        }
    }
}

/// What a document looked like on disk the last time it was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    modified: SystemTime,
    len: u64,
}

fn stamp(path: &Path) -> Option<Stamp> {
    let meta = fs::metadata(path).ok()?;
    Some(Stamp {
        modified: meta.modified().ok()?,
        len: meta.len(),
    })
}

/// Detects writes to the shared documents by comparing modification stamps.
///
/// Stamps are read without holding any lock; a write landing between the
/// stamp check and the reload only delays the next event by one tick.
pub struct ChangePoller {
    store: ChatStore,
    seen: HashMap<DocumentKind, Option<Stamp>>,
}

impl ChangePoller {
    pub fn new(store: ChatStore) -> Self {
        Self {
            store,
            seen: HashMap::new(),
        }
    }

    /// One pass over every document. The first pass reports all of them.
    pub fn tick(&mut self) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        for kind in DocumentKind::ALL {
            let current = stamp(self.store.document_path(kind));
            if self.seen.get(&kind) == Some(&current) {
                continue;
            }
            match self.reload(kind) {
                Ok(event) => {
                    debug!(document = %kind, "change detected");
                    self.seen.insert(kind, current);
                    events.push(event);
                }
                Err(e) => warn!(document = %kind, error = %e, "reload failed; retrying next tick"),
            }
        }
        events
    }

    fn reload(&mut self, kind: DocumentKind) -> Result<ChangeEvent> {
        Ok(match kind {
            DocumentKind::Messages => ChangeEvent::Messages(self.store.messages.get_all()?),
            DocumentKind::Users => ChangeEvent::Users(self.store.presence.get_all()?),
            DocumentKind::SharedFiles => {
                ChangeEvent::SharedFiles(self.store.shared_files.get_all()?)
            }
        })
    }

    /// Run on a dedicated thread, ticking every `interval` and sending events
    /// until the handle is stopped or dropped, or the receiver goes away.
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn spawn(mut self, interval: Duration) -> PollerHandle {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                for event in self.tick() {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
                thread::sleep(interval);
            }
        });

        PollerHandle {
            events: rx,
            interval,
            stop,
            thread: Some(thread),
        }
    }
}

/// Owner side of a running [`ChangePoller`].
pub struct PollerHandle {
    events: Receiver<ChangeEvent>,
    interval: Duration,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn events(&self) -> &Receiver<ChangeEvent> {
        &self.events
    }

    /// The interval the thread actually sleeps between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("poller thread panicked");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
