//! Directory-backed storage: one JSON file per key.
//!
//! Writes are atomic (temp file + rename) and serialized across processes
//! by an exclusive lock on `<dir>/.lock`. Subscriptions watch the key's
//! file, so separate processes pointed at the same directory see each
//! other's writes.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use parking_lot::Mutex;

use super::watcher::KeyWatcher;
use super::{OriginId, StorageBackend, StorageError, StorageEvent, StorageListener, Subscription};

const LOCK_FILE: &str = ".lock";
const WATCH_DEBOUNCE: Duration = Duration::from_millis(50);

struct FileInner {
    dir: PathBuf,
    /// Last value this instance wrote per key, and who wrote it. Lets
    /// watchers attribute a change to an origin.
    last_written: Mutex<HashMap<String, (Option<String>, OriginId)>>,
}

#[derive(Clone)]
pub struct FileStorage {
    inner: Arc<FileInner>,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(FileInner {
                dir: dir.into(),
                last_written: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// `<data dir>/cartkeeper/<namespace>`, falling back to the current
    /// directory when the platform has no data directory.
    pub fn default_dir(namespace: &str) -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("cartkeeper").join(namespace)
    }

    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// File holding `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.inner.dir.join(format!("{stem}.json"))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Run `f` while holding the directory's exclusive lock.
    fn with_lock<T>(
        &self,
        f: impl FnOnce() -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let dir = &self.inner.dir;
        fs::create_dir_all(dir).map_err(Self::io_error(dir))?;

        let lock_path = dir.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(Self::io_error(&lock_path))?;
        lock.lock_exclusive().map_err(Self::io_error(&lock_path))?;

        let result = f();
        let _ = FileExt::unlock(&lock);
        result
    }

    fn read_path(path: &Path) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Build the event for the key's current content, or `None` if it
    /// matches `last_seen`. Updates `last_seen`.
    fn change_event(&self, key: &str, last_seen: &mut Option<String>) -> Option<StorageEvent> {
        let current = match Self::read_path(&self.path_for(key)) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read changed storage file");
                return None;
            }
        };

        if current == *last_seen {
            return None;
        }
        last_seen.clone_from(&current);

        let origin = self
            .inner
            .last_written
            .lock()
            .get(key)
            .filter(|(written, _)| *written == current)
            .map(|(_, origin)| *origin);

        Some(StorageEvent {
            key: key.to_string(),
            new_value: current,
            origin,
        })
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::read_path(&self.path_for(key))
    }

    fn write(&self, key: &str, value: &str, origin: OriginId) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        self.with_lock(|| {
            fs::write(&tmp, value).map_err(Self::io_error(&tmp))?;
            // Recorded before the rename so a watcher can never observe the
            // new content without knowing who wrote it.
            self.inner
                .last_written
                .lock()
                .insert(key.to_string(), (Some(value.to_string()), origin));
            fs::rename(&tmp, &path).map_err(Self::io_error(&path))
        })
    }

    fn remove(&self, key: &str, origin: OriginId) -> Result<(), StorageError> {
        let path = self.path_for(key);

        self.with_lock(|| {
            self.inner
                .last_written
                .lock()
                .insert(key.to_string(), (None, origin));
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(source) => Err(StorageError::Io { path, source }),
            }
        })
    }

    fn subscribe(
        &self,
        key: &str,
        listener: StorageListener,
    ) -> Result<Subscription, StorageError> {
        let dir = &self.inner.dir;
        fs::create_dir_all(dir).map_err(Self::io_error(dir))?;

        let path = self.path_for(key);
        let mut last_seen = Self::read_path(&path)?;
        let storage = self.clone();
        let key = key.to_string();

        let watcher = KeyWatcher::start(&path, WATCH_DEBOUNCE, move || {
            if let Some(event) = storage.change_event(&key, &mut last_seen) {
                listener(&event);
            }
        })?;

        Ok(Subscription::new(move || drop(watcher)))
    }
}
