//! Configuration loading from `config.toml`.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{CheckoutConfig, ContainerConfig, StorageBackendKind, StorageConfig, StoreConfig};
