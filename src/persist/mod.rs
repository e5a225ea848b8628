//! Persistence of container state: hydration, debounced writes and
//! cross-context change delivery.

mod bridge;
mod debounce;

pub use bridge::{decode_items, PersistBridge};
pub use debounce::{DebouncedWriter, PendingCanceller};

use crate::container::ContainerKind;

/// Default quiet period before a scheduled write goes out.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// `"<namespace>:<kind>:v<version>"`, e.g. `storefront:cart:v3`.
pub fn storage_key(namespace: &str, kind: ContainerKind, schema_version: u32) -> String {
    format!("{}:{}:v{}", namespace, kind.as_str(), schema_version)
}
