use std::collections::HashSet;

use crate::container::intent::ContainerIntent;
use crate::container::policy::{ContainerPolicy, DuplicatePolicy};
use crate::container::state::ContainerState;
use crate::item::{clamp_to_stock, sanitize, Item};
use crate::mvi::Reducer;

pub struct ContainerReducer;

impl Reducer for ContainerReducer {
    type State = ContainerState;
    type Intent = ContainerIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ContainerIntent::Init { items } => {
                let policy = state.policy;
                ContainerState {
                    items: unique_by_id(items)
                        .into_iter()
                        .map(|item| fit_to_policy(item, &policy))
                        .collect(),
                    initialized: true,
                    policy,
                }
            }
            ContainerIntent::Add { item } => {
                let mut state = state;
                let incoming = fit_to_policy(sanitize(item), &state.policy);
                let merge = state.policy.on_duplicate == DuplicatePolicy::Merge
                    && state.policy.tracks_quantity;

                match state.items.iter_mut().find(|item| item.id == incoming.id) {
                    Some(existing) => {
                        if merge {
                            let total = i64::from(existing.quantity) + i64::from(incoming.quantity);
                            existing.quantity = clamp_to_stock(total, existing.stock);
                        }
                    }
                    None => {
                        if !state.is_full() {
                            state.items.push(incoming);
                        }
                    }
                }
                state
            }
            ContainerIntent::Remove { id } => {
                let mut state = state;
                state.items.retain(|item| item.id != id);
                state
            }
            ContainerIntent::UpdateQuantity { id, quantity } => {
                if !state.policy.tracks_quantity {
                    return state;
                }
                let mut state = state;
                if let Some(item) = state.items.iter_mut().find(|item| item.id == id) {
                    item.quantity = clamp_to_stock(quantity, item.stock);
                }
                state
            }
            ContainerIntent::Clear => ContainerState {
                items: Vec::new(),
                ..state
            },
        }
    }
}

/// Keep the first occurrence of every id.
fn unique_by_id(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

fn fit_to_policy(mut item: Item, policy: &ContainerPolicy) -> Item {
    if !policy.tracks_quantity {
        item.quantity = 1;
    }
    item
}
