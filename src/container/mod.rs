//! Item containers: cart, wishlist and comparison set.
//!
//! One reducer serves all three; the differences between them live in a
//! [`ContainerPolicy`] carried by the state.

mod intent;
mod policy;
mod reducer;
pub mod selectors;
mod state;
mod store;

pub use intent::ContainerIntent;
pub use policy::{ContainerKind, ContainerPolicy, DuplicatePolicy};
pub use reducer::ContainerReducer;
pub use state::ContainerState;
pub use store::Container;
