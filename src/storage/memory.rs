//! In-process storage shared by clones, the way one browser profile's
//! local storage is shared by its tabs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};

use super::{OriginId, StorageBackend, StorageError, StorageEvent, StorageListener, Subscription};

struct ListenerEntry {
    id: u64,
    key: String,
    listener: StorageListener,
}

#[derive(Default)]
struct MemoryInner {
    entries: Mutex<HashMap<String, String>>,
    /// Held from a mutation until its listeners have returned, so events
    /// reach listeners in the order the values were stored. Reentrant
    /// because a listener may write again on the same thread.
    delivery: ReentrantMutex<()>,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener: AtomicU64,
    /// Total bytes of keys plus values. `None` means unbounded.
    quota: Option<usize>,
    unavailable: AtomicBool,
}

/// Thread-safe in-memory [`StorageBackend`].
///
/// Clones share the same entries and listeners. Listeners run synchronously
/// on the writing thread after the write and only when the stored value
/// actually changed. Concurrent writers are delivered in storage order: a
/// second writer waits until the first one's listeners have returned.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                quota: Some(bytes),
                ..Default::default()
            }),
        }
    }

    /// Simulate storage being switched off (private browsing, disabled
    /// cookies). Every operation fails with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of registered listeners across all keys.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }

    fn notify(&self, event: StorageEvent) {
        // Snapshot under the listener lock, call outside it: listeners may
        // read or write this storage again.
        let listeners: Vec<StorageListener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .filter(|entry| entry.key == event.key)
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        for listener in listeners {
            listener(&event);
        }
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.inner.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str, origin: OriginId) -> Result<(), StorageError> {
        self.check_available()?;
        let _delivery = self.inner.delivery.lock();

        let changed = {
            let mut entries = self.inner.entries.lock();

            if let Some(quota) = self.inner.quota {
                let others: usize = entries
                    .iter()
                    .filter(|(existing, _)| existing.as_str() != key)
                    .map(|(existing, stored)| existing.len() + stored.len())
                    .sum();
                let needed = others + key.len() + value.len();
                if needed > quota {
                    return Err(StorageError::QuotaExceeded {
                        key: key.to_string(),
                        needed,
                        quota,
                    });
                }
            }

            match entries.insert(key.to_string(), value.to_string()) {
                Some(previous) => previous != value,
                None => true,
            }
        };

        if changed {
            self.notify(StorageEvent {
                key: key.to_string(),
                new_value: Some(value.to_string()),
                origin: Some(origin),
            });
        }
        Ok(())
    }

    fn remove(&self, key: &str, origin: OriginId) -> Result<(), StorageError> {
        self.check_available()?;
        let _delivery = self.inner.delivery.lock();

        let existed = self.inner.entries.lock().remove(key).is_some();
        if existed {
            self.notify(StorageEvent {
                key: key.to_string(),
                new_value: None,
                origin: Some(origin),
            });
        }
        Ok(())
    }

    fn subscribe(
        &self,
        key: &str,
        listener: StorageListener,
    ) -> Result<Subscription, StorageError> {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push(ListenerEntry {
            id,
            key: key.to_string(),
            listener,
        });

        let inner: Weak<MemoryInner> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().retain(|entry| entry.id != id);
            }
        }))
    }
}
