//! Product lines held by a container and the normalization applied to them.

mod sanitize;
mod types;

pub use sanitize::{clamp_quantity, clamp_to_stock, sanitize, sanitize_price, sanitize_stock, validate_list};
pub use types::{Item, RawItem, UNLIMITED_STOCK};
