//! The per-session set of containers.
//!
//! A [`StoreSession`] is built once and handed to consumers by reference;
//! there is no global instance.

use std::sync::Arc;

use crate::checkout::{CheckoutError, OrderSummary};
use crate::config::{CheckoutConfig, StorageBackendKind, StoreConfig};
use crate::container::{Container, ContainerKind};
use crate::item::RawItem;
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

pub struct StoreSession {
    cart: Container,
    wishlist: Container,
    compare: Container,
    checkout: CheckoutConfig,
}

impl StoreSession {
    /// Open and hydrate every container against `storage`.
    pub fn open(config: &StoreConfig, storage: Arc<dyn StorageBackend>) -> Self {
        let open = |kind: ContainerKind| {
            Container::open(
                kind,
                config.policy(kind),
                Arc::clone(&storage),
                config.container_key(kind),
                config.debounce(),
            )
        };

        let session = Self {
            cart: open(ContainerKind::Cart),
            wishlist: open(ContainerKind::Wishlist),
            compare: open(ContainerKind::Compare),
            checkout: config.checkout.clone(),
        };

        tracing::info!(
            namespace = %config.namespace,
            cart = session.cart.len(),
            wishlist = session.wishlist.len(),
            compare = session.compare.len(),
            "Store session opened"
        );
        session
    }

    /// Open with the backend named in the config.
    pub fn from_config(config: &StoreConfig) -> Self {
        let storage: Arc<dyn StorageBackend> = match config.storage.backend {
            StorageBackendKind::Memory => Arc::new(MemoryStorage::new()),
            StorageBackendKind::File => Arc::new(FileStorage::new(config.storage_dir())),
        };
        Self::open(config, storage)
    }

    pub fn cart(&self) -> &Container {
        &self.cart
    }

    pub fn wishlist(&self) -> &Container {
        &self.wishlist
    }

    pub fn compare(&self) -> &Container {
        &self.compare
    }

    pub fn container(&self, kind: ContainerKind) -> &Container {
        match kind {
            ContainerKind::Cart => &self.cart,
            ContainerKind::Wishlist => &self.wishlist,
            ContainerKind::Compare => &self.compare,
        }
    }

    /// Move a wishlist item into the cart with quantity 1. Returns false,
    /// leaving the wishlist untouched, if the wishlist does not hold `id`
    /// or the cart would not take it.
    pub fn move_to_cart(&self, id: &str) -> bool {
        let Some(item) = self.wishlist.get(id) else {
            return false;
        };

        let mut raw = RawItem::from(&item);
        raw.quantity = Some(1.0);
        self.cart.add_item(raw);
        if !self.cart.contains(id) {
            tracing::debug!(id = %id, "Cart refused wishlist item, keeping it wishlisted");
            return false;
        }
        self.wishlist.remove_item(id);
        true
    }

    /// Order built from the cart's available items.
    pub fn order_summary(&self) -> Result<OrderSummary, CheckoutError> {
        OrderSummary::build(&self.cart.items(), &self.checkout)
    }

    pub fn checkout_link(&self) -> Result<String, CheckoutError> {
        self.order_summary()?.messaging_link()
    }

    /// Write every container's pending change now.
    pub fn flush(&self) {
        for kind in ContainerKind::all() {
            self.container(*kind).flush();
        }
    }
}
