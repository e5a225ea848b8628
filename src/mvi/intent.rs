//! Requests to change a container.

/// A consumer action (add, remove, change quantity, clear) or a storage
/// event (hydration, another context rewriting the key). Sent between
/// threads when a change arrives from the storage listener.
pub trait Intent: Send + 'static {}
