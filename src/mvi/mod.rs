//! Intent/reducer primitives every item container is built on.
//!
//! A consumer call becomes an [`Intent`], a [`Reducer`] turns the current
//! [`StoreState`] into the next one, and the container decides from the
//! difference whether to schedule a write.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::StoreState;
