use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::item::{validate_list, Item};
use crate::persist::debounce::{DebouncedWriter, PendingCanceller};
use crate::storage::{
    OriginId, StorageBackend, StorageError, StorageEvent, StorageListener, Subscription,
};

/// Read and decode `key`. Missing, unreadable or corrupt data gives `[]`.
fn read_items(storage: &dyn StorageBackend, key: &str) -> Vec<Item> {
    match storage.read(key) {
        Ok(Some(raw)) => decode_items(&raw),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Reading stored items failed, using empty list");
            Vec::new()
        }
    }
}

/// Decode a persisted payload. Malformed JSON or a wrong shape yields an
/// empty or partial list, never an error.
pub fn decode_items(raw: &str) -> Vec<Item> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => validate_list(&value),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding unparseable persisted items");
            Vec::new()
        }
    }
}

type ChangeCallback = Arc<dyn Fn(Vec<Item>) + Send + Sync>;

/// A serialized list tagged with the sync generation it was built in.
struct StampedPayload {
    generation: u64,
    body: String,
}

/// Shared between the bridge, its writer thread and its listener.
#[derive(Default)]
struct SyncState {
    /// Bumped whenever another context's write supersedes local state.
    generation: AtomicU64,
    on_change: Mutex<Option<ChangeCallback>>,
}

impl SyncState {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn deliver(&self, items: Vec<Item>) {
        let callback = self.on_change.lock().clone();
        if let Some(callback) = callback {
            callback(items);
        }
    }
}

/// Connects one container to one storage key.
///
/// Every failure is logged and absorbed: the in-memory state stays
/// authoritative for the session.
///
/// Each payload carries the generation it was built in. A payload whose
/// generation is outdated by the time the writer reaches it is dropped.
/// If another context writes while a payload is already being stored, the
/// bridge re-reads the key afterwards and delivers whatever won.
pub struct PersistBridge {
    storage: Arc<dyn StorageBackend>,
    key: String,
    origin: OriginId,
    sync: Arc<SyncState>,
    writer: DebouncedWriter<StampedPayload>,
}

impl PersistBridge {
    pub fn new(storage: Arc<dyn StorageBackend>, key: impl Into<String>, debounce: Duration) -> Self {
        let key = key.into();
        let origin = OriginId::new();
        let sync = Arc::new(SyncState::default());

        let sink_storage = Arc::clone(&storage);
        let sink_key = key.clone();
        let sink_sync = Arc::clone(&sync);
        let writer = DebouncedWriter::spawn(&key, debounce, move |payload: StampedPayload| {
            if sink_sync.generation() != payload.generation {
                tracing::debug!(key = %sink_key, "Dropping write superseded by another context");
                return;
            }
            if let Err(e) = sink_storage.write(&sink_key, &payload.body, origin) {
                tracing::warn!(key = %sink_key, error = %e, "Persist failed, keeping in-memory state");
                return;
            }
            if sink_sync.generation() != payload.generation {
                tracing::debug!(key = %sink_key, "Another context wrote during persist, re-reading");
                sink_sync.deliver(read_items(sink_storage.as_ref(), &sink_key));
            }
        });

        Self {
            storage,
            key,
            origin,
            sync,
            writer,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn origin(&self) -> OriginId {
        self.origin
    }

    /// Read the stored list. Missing, unreadable or corrupt data gives `[]`.
    pub fn hydrate(&self) -> Vec<Item> {
        read_items(self.storage.as_ref(), &self.key)
    }

    /// Schedule a debounced write of `items`.
    pub fn persist(&self, items: &[Item]) {
        match serde_json::to_string(items) {
            Ok(body) => self.writer.schedule(StampedPayload {
                generation: self.sync.generation(),
                body,
            }),
            Err(source) => {
                let e = StorageError::Serialize {
                    key: self.key.clone(),
                    source,
                };
                tracing::warn!(key = %self.key, error = %e, "Persist skipped");
            }
        }
    }

    /// Write any pending payload now.
    pub fn flush(&self) {
        self.writer.flush();
    }

    /// Handle for discarding local writes once another context's write has
    /// superseded them: the pending payload is dropped and any payload
    /// scheduled before the call is skipped by the writer.
    ///
    /// Call it under the same lock that guards [`persist`](Self::persist)
    /// so that no payload slips in between.
    pub fn pending_canceller(&self) -> PendingCanceller {
        let sync = Arc::clone(&self.sync);
        let writer = self.writer.canceller();
        PendingCanceller::new(move || {
            sync.generation.fetch_add(1, Ordering::SeqCst);
            writer.cancel();
        })
    }

    /// Deliver the re-hydrated list whenever another origin changes the key.
    ///
    /// Returns `None` if the backend cannot watch the key; the container
    /// then simply stops syncing with other contexts.
    pub fn on_external_change<F>(&self, callback: F) -> Option<Subscription>
    where
        F: Fn(Vec<Item>) + Send + Sync + 'static,
    {
        let callback: ChangeCallback = Arc::new(callback);
        *self.sync.on_change.lock() = Some(Arc::clone(&callback));

        let own = self.origin;
        let listener: StorageListener = Arc::new(move |event: &StorageEvent| {
            if event.origin == Some(own) {
                return;
            }
            let items = event
                .new_value
                .as_deref()
                .map(decode_items)
                .unwrap_or_default();
            callback(items);
        });

        match self.storage.subscribe(&self.key, listener) {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cross-context sync disabled");
                None
            }
        }
    }
}
