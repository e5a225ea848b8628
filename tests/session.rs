mod common;

use std::sync::Arc;

use cartkeeper::checkout::CheckoutError;
use cartkeeper::config::{StorageBackendKind, StoreConfig};
use cartkeeper::storage::MemoryStorage;
use cartkeeper::{ContainerKind, StoreSession};
use common::raw;

fn memory_config() -> StoreConfig {
    let mut config = StoreConfig::default();
    config.storage.backend = StorageBackendKind::Memory;
    config.checkout.phone = Some("+1 (555) 010-2030".to_string());
    config.checkout.currency_symbol = "$".to_string();
    config.checkout.greeting = "Order:".to_string();
    config
}

#[test]
fn containers_follow_configured_policies() {
    let session = StoreSession::from_config(&memory_config());

    assert_eq!(session.cart().key(), "storefront:cart:v3");
    assert_eq!(session.container(ContainerKind::Wishlist).kind(), ContainerKind::Wishlist);
    assert!(session.cart().is_initialized());

    for id in ["a", "b", "c", "d", "e"] {
        session.compare().add_item(raw(id, "X", 1.0));
    }
    assert_eq!(session.compare().len(), 4);

    assert!(session.wishlist().add_item(raw("w", "W", 1.0).quantity(5.0)));
    assert!(!session.wishlist().add_item(raw("w", "W", 1.0)));
    assert_eq!(session.wishlist().get("w").unwrap().quantity, 1);
}

#[test]
fn move_to_cart_transfers_with_quantity_one() {
    let session = StoreSession::from_config(&memory_config());
    session.wishlist().add_item(raw("w", "Lamp", 40.0).stock(3.0));
    session.cart().add_item(raw("w", "Lamp", 40.0).quantity(1.0).stock(3.0));

    assert!(session.move_to_cart("w"));
    assert!(!session.wishlist().contains("w"));
    assert_eq!(session.cart().get("w").unwrap().quantity, 2);

    assert!(!session.move_to_cart("w"));
}

#[test]
fn move_to_full_cart_keeps_wishlist_item() {
    let mut config = memory_config();
    config.cart.capacity = Some(1);
    let session = StoreSession::from_config(&config);
    session.cart().add_item(raw("x", "Kettle", 20.0));
    session.wishlist().add_item(raw("w", "Lamp", 40.0));

    assert!(!session.move_to_cart("w"));
    assert!(!session.cart().contains("w"));
    assert!(session.wishlist().contains("w"));
    assert_eq!(session.cart().len(), 1);
}

#[test]
fn checkout_link_encodes_available_items() {
    let session = StoreSession::from_config(&memory_config());
    session.cart().add_item(raw("a", "Tea", 4.5).quantity(2.0));
    session.cart().add_item(raw("b", "Gone", 99.0).in_stock(false));

    let summary = session.order_summary().unwrap();
    assert_eq!(summary.render(), "Order:\n1. Tea x2 - $9.00\nTotal: $9.00");

    let link = session.checkout_link().unwrap();
    assert!(link.starts_with("https://wa.me/15550102030?text="));
    assert!(link.contains("Tea%20x2"));
    assert!(!link.contains("Gone"));
}

#[test]
fn checkout_errors() {
    let mut config = memory_config();
    config.checkout.phone = None;
    let session = StoreSession::from_config(&config);

    assert_eq!(session.checkout_link().unwrap_err(), CheckoutError::EmptyOrder);

    session.cart().add_item(raw("a", "Tea", 4.5));
    assert_eq!(
        session.checkout_link().unwrap_err(),
        CheckoutError::MissingContact
    );
}

#[test]
fn sessions_share_storage_per_key() {
    let storage = MemoryStorage::new();
    let config = memory_config();
    let first = StoreSession::open(&config, Arc::new(storage.clone()));
    let second = StoreSession::open(&config, Arc::new(storage.clone()));

    first.cart().add_item(raw("a", "Tea", 4.5));
    first.wishlist().add_item(raw("w", "Lamp", 40.0));
    first.flush();

    assert!(second.cart().contains("a"));
    assert!(second.wishlist().contains("w"));
    assert!(second.compare().is_empty());
}

#[test]
fn file_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::default();
    config.storage.dir = Some(dir.path().to_path_buf());

    {
        let session = StoreSession::from_config(&config);
        session.cart().add_item(raw("a", "Tea", 4.5).quantity(3.0));
        session.compare().add_item(raw("c", "Kettle", 20.0));
    }

    let reopened = StoreSession::from_config(&config);
    assert_eq!(reopened.cart().get("a").unwrap().quantity, 3);
    assert!(reopened.compare().contains("c"));
    assert!(reopened.wishlist().is_empty());
}
