//! Client-side item containers for a storefront: cart, wishlist and
//! comparison set.
//!
//! Each container is a pure reducer over sanitized items, persisted to a
//! key-addressed store with debounced writes and kept in sync with other
//! contexts that share the key.

pub mod checkout;
pub mod config;
pub mod container;
pub mod item;
pub mod logging;
pub mod mvi;
pub mod persist;
pub mod session;
pub mod storage;

pub use container::{Container, ContainerKind, ContainerPolicy, DuplicatePolicy};
pub use item::{Item, RawItem};
pub use session::StoreSession;
