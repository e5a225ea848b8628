use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::container::{ContainerKind, ContainerPolicy, DuplicatePolicy};
use crate::persist::{storage_key, DEFAULT_DEBOUNCE_MS};
use crate::storage::FileStorage;

/// Root configuration container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// First segment of every storage key (e.g. "storefront").
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Quiet period before a scheduled write goes out, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cart: ContainerConfig,
    #[serde(default)]
    pub wishlist: ContainerConfig,
    #[serde(default)]
    pub compare: ContainerConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

/// Where serialized item lists live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Directory for the file backend. Defaults to the platform data dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    File,
    Memory,
}

/// Per-container overrides. Unset fields fall back to the container
/// kind's defaults (see [`ContainerKind::default_policy`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default)]
    pub on_duplicate: Option<DuplicatePolicy>,
    #[serde(default)]
    pub tracks_quantity: Option<bool>,
    /// Maximum distinct items. `0` removes the limit.
    #[serde(default)]
    pub capacity: Option<usize>,
    /// Bumped when the persisted layout changes; old keys are then ignored.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

/// Order hand-off settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Messaging contact, any formatting. Only digits are used.
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_namespace() -> String {
    "storefront".to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_schema_version() -> u32 {
    3
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_greeting() -> String {
    "Hello! I would like to order:".to_string()
}

impl ContainerConfig {
    pub fn policy(&self, kind: ContainerKind) -> ContainerPolicy {
        let defaults = kind.default_policy();
        ContainerPolicy {
            on_duplicate: self.on_duplicate.unwrap_or(defaults.on_duplicate),
            tracks_quantity: self.tracks_quantity.unwrap_or(defaults.tracks_quantity),
            capacity: match self.capacity {
                Some(0) => None,
                Some(capacity) => Some(capacity),
                None => defaults.capacity,
            },
        }
    }
}

impl StoreConfig {
    pub fn container(&self, kind: ContainerKind) -> &ContainerConfig {
        match kind {
            ContainerKind::Cart => &self.cart,
            ContainerKind::Wishlist => &self.wishlist,
            ContainerKind::Compare => &self.compare,
        }
    }

    pub fn policy(&self, kind: ContainerKind) -> ContainerPolicy {
        self.container(kind).policy(kind)
    }

    pub fn container_key(&self, kind: ContainerKind) -> String {
        storage_key(&self.namespace, kind, self.container(kind).schema_version)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Directory used by the file backend.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .dir
            .clone()
            .unwrap_or_else(|| FileStorage::default_dir(&self.namespace))
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            on_duplicate: None,
            tracks_quantity: None,
            capacity: None,
            schema_version: default_schema_version(),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            phone: None,
            currency_symbol: default_currency_symbol(),
            greeting: default_greeting(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            debounce_ms: default_debounce_ms(),
            storage: StorageConfig::default(),
            cart: ContainerConfig::default(),
            wishlist: ContainerConfig::default(),
            compare: ContainerConfig::default(),
            checkout: CheckoutConfig::default(),
        }
    }
}
