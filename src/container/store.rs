//! The container handle consumers hold.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::container::intent::ContainerIntent;
use crate::container::policy::{ContainerKind, ContainerPolicy};
use crate::container::reducer::ContainerReducer;
use crate::container::selectors;
use crate::container::state::ContainerState;
use crate::item::{Item, RawItem};
use crate::mvi::Reducer;
use crate::persist::PersistBridge;
use crate::storage::{StorageBackend, Subscription};

/// One cart, wishlist or comparison set, constructed once per session and
/// passed by reference to whatever needs it.
///
/// Dispatches run synchronously on the caller's thread. State changes on
/// an initialized container schedule a debounced write; changes made by
/// other contexts arrive as `Init` (last writer wins).
pub struct Container {
    kind: ContainerKind,
    state: Arc<Mutex<ContainerState>>,
    // Field order matters: the subscription is released before the bridge
    // flushes and joins its writer thread.
    subscription: Mutex<Option<Subscription>>,
    bridge: PersistBridge,
}

impl Container {
    /// Create an empty, uninitialized container. Call [`load`](Self::load)
    /// to hydrate it.
    pub fn new(
        kind: ContainerKind,
        policy: ContainerPolicy,
        storage: Arc<dyn StorageBackend>,
        key: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(ContainerState::with_policy(policy))),
            subscription: Mutex::new(None),
            bridge: PersistBridge::new(storage, key, debounce),
        }
    }

    /// [`new`](Self::new) followed by [`load`](Self::load).
    pub fn open(
        kind: ContainerKind,
        policy: ContainerPolicy,
        storage: Arc<dyn StorageBackend>,
        key: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        let container = Self::new(kind, policy, storage, key, debounce);
        container.load();
        container
    }

    /// Start listening for changes made by other contexts, then hydrate
    /// from storage and apply `Init`. Only the first call has an effect.
    ///
    /// Subscribing first means a write landing during hydration is either
    /// read by it or delivered afterwards, never missed. Hydration runs
    /// under the state lock, so a delivered change always applies after it.
    pub fn load(&self) {
        let mut subscription = self.subscription.lock();
        if self.state.lock().initialized || subscription.is_some() {
            return;
        }

        let state = Arc::clone(&self.state);
        let kind = self.kind;
        let canceller = self.bridge.pending_canceller();
        *subscription = self.bridge.on_external_change(move |items| {
            tracing::debug!(
                kind = kind.as_str(),
                count = items.len(),
                "Storage changed in another context, re-hydrating"
            );
            let mut guard = state.lock();
            // The other context wrote last; local writes not yet stored
            // are stale.
            canceller.cancel();
            let current = std::mem::take(&mut *guard);
            *guard = ContainerReducer::reduce(current, ContainerIntent::Init { items });
        });

        let mut guard = self.state.lock();
        let items = self.bridge.hydrate();
        tracing::debug!(
            kind = self.kind.as_str(),
            key = %self.bridge.key(),
            count = items.len(),
            "Container hydrated"
        );
        let current = std::mem::take(&mut *guard);
        *guard = ContainerReducer::reduce(current, ContainerIntent::Init { items });
    }

    /// Apply `intent`. Returns whether the state changed.
    ///
    /// `Init` never comes through here: `load` and the change listener apply
    /// it directly and it is never persisted.
    fn dispatch(&self, intent: ContainerIntent) -> bool {
        let mut guard = self.state.lock();
        let previous = std::mem::take(&mut *guard);
        let next = ContainerReducer::reduce(previous.clone(), intent);
        let changed = next != previous;
        *guard = next;

        // Scheduling only enqueues, so it is done under the lock to keep
        // writes in dispatch order.
        if changed && guard.initialized {
            self.bridge.persist(&guard.items);
        }
        changed
    }

    /// Add an item. Returns false when nothing changed: a rejected
    /// duplicate, a full container, or a merge already at the stock ceiling.
    pub fn add_item(&self, item: RawItem) -> bool {
        let id = item.id.clone();
        let changed = self.dispatch(ContainerIntent::Add { item });
        if !changed {
            tracing::debug!(kind = self.kind.as_str(), id = %id, "Add left container unchanged");
        }
        changed
    }

    pub fn remove_item(&self, id: &str) -> bool {
        self.dispatch(ContainerIntent::Remove { id: id.to_string() })
    }

    /// Set an item's quantity, clamped to `[1, stock]`.
    pub fn update_quantity(&self, id: &str, quantity: i64) -> bool {
        self.dispatch(ContainerIntent::UpdateQuantity {
            id: id.to_string(),
            quantity,
        })
    }

    pub fn clear_all(&self) -> bool {
        self.dispatch(ContainerIntent::Clear)
    }

    /// Remove the item if present, add it otherwise. Returns whether the
    /// item is present afterwards.
    pub fn toggle_item(&self, item: RawItem) -> bool {
        if self.contains(&item.id) {
            self.remove_item(&item.id);
            false
        } else {
            let id = item.id.clone();
            self.add_item(item);
            self.contains(&id)
        }
    }

    /// Write any pending change to storage now.
    pub fn flush(&self) {
        self.bridge.flush();
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        self.bridge.key()
    }

    pub fn policy(&self) -> ContainerPolicy {
        self.state.lock().policy
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn snapshot(&self) -> ContainerState {
        self.state.lock().clone()
    }

    pub fn items(&self) -> Vec<Item> {
        self.state.lock().items.clone()
    }

    pub fn get(&self, id: &str) -> Option<Item> {
        self.state.lock().find(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn available_items(&self) -> Vec<Item> {
        selectors::available_items(&self.state.lock().items)
            .cloned()
            .collect()
    }

    pub fn unavailable_items(&self) -> Vec<Item> {
        selectors::unavailable_items(&self.state.lock().items)
            .cloned()
            .collect()
    }

    pub fn subtotal(&self) -> f64 {
        selectors::subtotal(&self.state.lock().items)
    }

    pub fn total_items(&self) -> u64 {
        let state = self.state.lock();
        selectors::total_items(&state.items, &state.policy)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Container")
            .field("kind", &self.kind)
            .field("key", &self.bridge.key())
            .field("items", &state.items.len())
            .field("initialized", &state.initialized)
            .finish()
    }
}
