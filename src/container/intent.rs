use crate::item::{Item, RawItem};
use crate::mvi::Intent;

#[derive(Debug, Clone)]
pub enum ContainerIntent {
    /// Hydration finished (or another context rewrote the key).
    /// Replaces the items and marks the container initialized.
    Init { items: Vec<Item> },
    /// Sanitized by the reducer before it is applied.
    Add { item: RawItem },
    /// Idempotent.
    Remove { id: String },
    /// Clamped to `[1, stock]`. Ignored by containers that do not track quantity.
    UpdateQuantity { id: String, quantity: i64 },
    /// Empties the items; `initialized` is left alone.
    Clear,
}

impl Intent for ContainerIntent {}
