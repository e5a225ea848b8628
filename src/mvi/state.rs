//! State held by a container.

/// Snapshot of one container's contents.
///
/// `Default` is the empty, not yet hydrated container, which lets a
/// container swap its state out with `mem::take` while reducing. Equality
/// decides whether a transition is worth a storage write.
pub trait StoreState: Clone + PartialEq + Default + Send + 'static {}
