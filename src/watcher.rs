use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{HotfolderError, Result};
use crate::events::{FileEvent, FileEventKind};

/// Watches a single directory (non-recursively) and forwards create and
/// modify events for regular files over a channel. Dropping the watcher
/// tears down the subscription; the forwarding thread exits once the
/// notify channel disconnects.
pub struct FolderWatcher {
    _watcher: RecommendedWatcher,
    event_rx: Receiver<FileEvent>,
    path: PathBuf,
}

impl FolderWatcher {
    pub fn new<P: AsRef<Path>>(path: P, debounce: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_dir() {
            return Err(HotfolderError::InvalidPath(path));
        }

        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
        let (event_tx, event_rx) = mpsc::channel::<FileEvent>();

        // Create the notify watcher
        let mut watcher =
            notify::recommended_watcher(tx).map_err(|source| HotfolderError::WatchInit {
                path: path.clone(),
                source,
            })?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|source| HotfolderError::WatchInit {
                path: path.clone(),
                source,
            })?;

        // Spawn background thread to classify, debounce, and forward events
        thread::spawn(move || {
            let mut last_event_time = HashMap::<PathBuf, Instant>::new();

            while let Ok(result) = rx.recv() {
                match result {
                    Ok(event) => {
                        let kind = match event.kind {
                            EventKind::Create(_) => FileEventKind::Created,
                            EventKind::Modify(_) => FileEventKind::Modified,
                            _ => continue,
                        };

                        let now = Instant::now();

                        for path in event.paths {
                            // Directory events carry nothing to copy. A path
                            // that no longer exists is still forwarded so the
                            // copier can record the vanished source.
                            if path.is_dir() {
                                continue;
                            }

                            // Debounce: drop events that follow too quickly
                            // after the previous one for the same path
                            if let Some(last_time) = last_event_time.get(&path) {
                                if now.duration_since(*last_time) < debounce {
                                    continue;
                                }
                            }
                            last_event_time.insert(path.clone(), now);

                            if event_tx.send(FileEvent::new(path, kind)).is_err() {
                                return; // Receiver dropped, exit thread
                            }
                        }
                    }
                    Err(err) => {
                        tracing::error!("file watcher error: {err}");
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_rx,
            path,
        })
    }

    /// The directory this watcher was started on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_recv(&self) -> std::result::Result<FileEvent, mpsc::TryRecvError> {
        self.event_rx.try_recv()
    }

    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<FileEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}
