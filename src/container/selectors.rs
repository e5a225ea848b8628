//! Values derived from a container's items. Recomputed on demand, never stored.

use crate::container::policy::ContainerPolicy;
use crate::item::Item;

/// Items whose `in_stock` flag is set.
pub fn available_items(items: &[Item]) -> impl Iterator<Item = &Item> {
    items.iter().filter(|item| item.in_stock)
}

pub fn unavailable_items(items: &[Item]) -> impl Iterator<Item = &Item> {
    items.iter().filter(|item| !item.in_stock)
}

/// Sum of `price * quantity` over available items.
pub fn subtotal(items: &[Item]) -> f64 {
    available_items(items).map(Item::line_total).sum()
}

/// Sum of quantities for quantity-tracking containers, item count otherwise.
pub fn total_items(items: &[Item], policy: &ContainerPolicy) -> u64 {
    if policy.tracks_quantity {
        items.iter().map(|item| u64::from(item.quantity)).sum()
    } else {
        items.len() as u64
    }
}
