use serde::{Deserialize, Serialize};

/// What `Add` does when the id is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Sum quantities, clamped to the existing item's stock.
    #[default]
    Merge,
    /// Leave the container untouched.
    Reject,
}

/// Which container a state belongs to. Also the middle segment of its
/// storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Cart,
    Wishlist,
    Compare,
}

impl ContainerKind {
    /// Stable storage key segment. Once published, do not rename.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
            Self::Compare => "compare",
        }
    }

    pub fn all() -> &'static [ContainerKind] {
        &[Self::Cart, Self::Wishlist, Self::Compare]
    }

    pub fn default_policy(&self) -> ContainerPolicy {
        match self {
            Self::Cart => ContainerPolicy::cart(),
            Self::Wishlist => ContainerPolicy::wishlist(),
            Self::Compare => ContainerPolicy::compare(),
        }
    }
}

/// Behavioral knobs of a container, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerPolicy {
    pub on_duplicate: DuplicatePolicy,
    /// When false every item is held with quantity 1 and
    /// `UpdateQuantity` is ignored.
    pub tracks_quantity: bool,
    /// Maximum number of distinct items. `None` means unbounded.
    pub capacity: Option<usize>,
}

impl ContainerPolicy {
    pub const COMPARE_CAPACITY: usize = 4;

    pub fn cart() -> Self {
        Self {
            on_duplicate: DuplicatePolicy::Merge,
            tracks_quantity: true,
            capacity: None,
        }
    }

    pub fn wishlist() -> Self {
        Self {
            on_duplicate: DuplicatePolicy::Reject,
            tracks_quantity: false,
            capacity: None,
        }
    }

    pub fn compare() -> Self {
        Self {
            on_duplicate: DuplicatePolicy::Reject,
            tracks_quantity: false,
            capacity: Some(Self::COMPARE_CAPACITY),
        }
    }
}

impl Default for ContainerPolicy {
    fn default() -> Self {
        Self::cart()
    }
}
