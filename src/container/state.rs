use crate::container::policy::ContainerPolicy;
use crate::item::Item;
use crate::mvi::StoreState;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContainerState {
    pub items: Vec<Item>,
    /// False until the first hydration read has been applied. Persistence
    /// stays off while false so an empty startup state never overwrites
    /// stored data.
    pub initialized: bool,
    pub policy: ContainerPolicy,
}

impl StoreState for ContainerState {}

impl ContainerState {
    pub fn with_policy(policy: ContainerPolicy) -> Self {
        Self {
            items: Vec::new(),
            initialized: false,
            policy,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// True when no further distinct item may be added.
    pub fn is_full(&self) -> bool {
        self.policy
            .capacity
            .is_some_and(|capacity| self.items.len() >= capacity)
    }
}
