//! Key-addressed persistent storage with change notifications.
//!
//! [`StorageBackend`] is the seam between the containers and wherever the
//! serialized item lists live. Backends notify subscribers when a key
//! changes so that contexts sharing a key (browser tabs, processes, several
//! containers in one process) converge on the last write.

mod error;
mod file;
mod memory;
mod watcher;

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Identity of one writing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginId(Uuid);

impl OriginId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OriginId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A key changed.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    /// Writer of the change, when the backend knows it.
    pub origin: Option<OriginId>,
}

pub type StorageListener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Handle to a registered listener. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Storage for serialized item lists.
///
/// All methods take `&self`; implementations use interior mutability so a
/// single backend can be shared by every container of a session.
pub trait StorageBackend: Send + Sync {
    /// Returns `Ok(None)` if the key does not exist.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str, origin: OriginId) -> Result<(), StorageError>;

    /// Returns `Ok(())` even if the key did not exist.
    fn remove(&self, key: &str, origin: OriginId) -> Result<(), StorageError>;

    /// Register `listener` for changes to `key`, including the caller's own
    /// writes. Filtering by origin is up to the listener.
    fn subscribe(&self, key: &str, listener: StorageListener)
        -> Result<Subscription, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn subscription_runs_cancel_once_on_drop() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let subscription = Subscription::new(move || {
            assert!(!flag.swap(true, Ordering::SeqCst));
        });
        assert!(format!("{:?}", subscription).contains("active: true"));
        drop(subscription);
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn origins_are_unique() {
        assert_ne!(OriginId::new(), OriginId::new());
    }
}
