//! Turning a cart into a human-readable order and a messaging link.
//!
//! Templating only: nothing here talks to a network.

mod format;
mod summary;

pub use format::format_price;
pub use summary::{CheckoutError, OrderLine, OrderSummary};
