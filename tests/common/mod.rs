//! Shared test utilities and spy storage.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use cartkeeper::storage::{
    MemoryStorage, OriginId, StorageBackend, StorageError, StorageListener, Subscription,
};
use cartkeeper::{Container, ContainerKind, ContainerPolicy, RawItem};
use parking_lot::Mutex;

pub const CART_KEY: &str = "storefront:cart:v3";

/// Long enough that only `flush` or drop ever triggers a write.
pub const LONG_DEBOUNCE: Duration = Duration::from_secs(30);

/// Storage that records every write before delegating to a `MemoryStorage`.
#[derive(Clone, Default)]
pub struct SpyStorage {
    inner: MemoryStorage,
    writes: Arc<Mutex<Vec<(String, String)>>>,
}

impl SpyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn over(inner: MemoryStorage) -> Self {
        Self {
            inner,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn memory(&self) -> &MemoryStorage {
        &self.inner
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

impl StorageBackend for SpyStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str, origin: OriginId) -> Result<(), StorageError> {
        self.writes
            .lock()
            .push((key.to_string(), value.to_string()));
        self.inner.write(key, value, origin)
    }

    fn remove(&self, key: &str, origin: OriginId) -> Result<(), StorageError> {
        self.inner.remove(key, origin)
    }

    fn subscribe(
        &self,
        key: &str,
        listener: StorageListener,
    ) -> Result<Subscription, StorageError> {
        self.inner.subscribe(key, listener)
    }
}

type Hook = Box<dyn FnOnce() + Send>;

/// `MemoryStorage` that runs a one-shot hook around the next read or write,
/// to interleave another context's activity at an exact point.
#[derive(Clone, Default)]
pub struct HookStorage {
    inner: MemoryStorage,
    after_read: Arc<Mutex<Option<Hook>>>,
    before_write: Arc<Mutex<Option<Hook>>>,
}

impl HookStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &MemoryStorage {
        &self.inner
    }

    pub fn after_next_read(&self, hook: impl FnOnce() + Send + 'static) {
        *self.after_read.lock() = Some(Box::new(hook));
    }

    pub fn before_next_write(&self, hook: impl FnOnce() + Send + 'static) {
        *self.before_write.lock() = Some(Box::new(hook));
    }
}

impl StorageBackend for HookStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.inner.read(key);
        let hook = self.after_read.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        value
    }

    fn write(&self, key: &str, value: &str, origin: OriginId) -> Result<(), StorageError> {
        let hook = self.before_write.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        self.inner.write(key, value, origin)
    }

    fn remove(&self, key: &str, origin: OriginId) -> Result<(), StorageError> {
        self.inner.remove(key, origin)
    }

    fn subscribe(
        &self,
        key: &str,
        listener: StorageListener,
    ) -> Result<Subscription, StorageError> {
        self.inner.subscribe(key, listener)
    }
}

pub fn raw(id: &str, name: &str, price: f64) -> RawItem {
    RawItem::new(id, name, price)
}

pub fn cart_on(storage: Arc<dyn StorageBackend>) -> Container {
    Container::open(
        ContainerKind::Cart,
        ContainerPolicy::cart(),
        storage,
        CART_KEY,
        LONG_DEBOUNCE,
    )
}

/// Write a payload from an unrelated context.
pub fn write_foreign(storage: &dyn StorageBackend, key: &str, payload: &str) {
    storage
        .write(key, payload, OriginId::new())
        .expect("foreign write");
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}
