//! File watching with debouncing for file-backed keys.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::StorageError;

/// Watches one file and calls `on_change` after a quiet period.
///
/// Runs in a background thread with debouncing to group the bursts of
/// events an atomic write produces. Dropping the watcher stops the thread.
pub(crate) struct KeyWatcher {
    // The watcher is kept alive by being stored here.
    _watcher: RecommendedWatcher,
    active: Arc<AtomicBool>,
}

impl KeyWatcher {
    /// Start watching `path`. Its parent directory must exist.
    pub(crate) fn start(
        path: &Path,
        debounce: Duration,
        on_change: impl FnMut() + Send + 'static,
    ) -> Result<Self, StorageError> {
        let watch_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_default();

        let (raw_tx, raw_rx) = mpsc::channel();

        let watch_error = |source| StorageError::Watch {
            path: path.to_path_buf(),
            source,
        };

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                if let Ok(event) = result {
                    let _ = raw_tx.send(event);
                }
            },
            notify::Config::default(),
        )
        .map_err(watch_error)?;

        // Watch the parent directory (handles deletion + recreation and
        // the rename at the end of an atomic write).
        watcher
            .watch(watch_dir, RecursiveMode::NonRecursive)
            .map_err(watch_error)?;

        let active = Arc::new(AtomicBool::new(true));
        let loop_active = Arc::clone(&active);
        thread::Builder::new()
            .name("storage-watch".to_string())
            .spawn(move || debounce_loop(raw_rx, file_name, debounce, loop_active, on_change))
            .map_err(|source| StorageError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            _watcher: watcher,
            active,
        })
    }
}

impl Drop for KeyWatcher {
    fn drop(&mut self) {
        // Events already queued must not reach the listener anymore.
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Waits for `debounce` after the last relevant event before firing.
fn debounce_loop(
    rx: mpsc::Receiver<Event>,
    file_name: OsString,
    debounce: Duration,
    active: Arc<AtomicBool>,
    mut on_change: impl FnMut(),
) {
    let mut pending: Option<Instant> = None;

    loop {
        let timeout = match pending {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::from_secs(60),
        };

        match rx.recv_timeout(timeout) {
            Ok(event) => {
                if is_key_event(&event, &file_name) {
                    pending = Some(Instant::now() + debounce);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(deadline) = pending {
                    if Instant::now() >= deadline {
                        pending = None;
                        if !active.load(Ordering::SeqCst) {
                            break;
                        }
                        on_change();
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Check if a notify event touches the watched file.
fn is_key_event(event: &Event, file_name: &OsStr) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    );

    if !relevant {
        return false;
    }

    event
        .paths
        .iter()
        .any(|p| p.file_name().map(|name| name == file_name).unwrap_or(false))
}
