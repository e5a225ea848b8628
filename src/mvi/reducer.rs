//! State transition function.

use super::intent::Intent;
use super::state::StoreState;

/// The only place container contents change.
///
/// `reduce` never touches storage or logs; persistence and cross-context
/// sync observe the result from the outside.
pub trait Reducer {
    type State: StoreState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
