//! Engine error types.

use crate::id::StateId;
use thiserror::Error;

/// Errors from the state machine engine.
///
/// A rejected event is not an error; `dispatch` reports it through its
/// boolean result. These variants all indicate wiring defects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    #[error("no current state set; call set_current_state before dispatch")]
    NoCurrentState,

    #[error("state {id} is not registered")]
    UnknownState { id: StateId },

    #[error("transition target {target} from state {from} is not registered")]
    UnknownTarget { from: StateId, target: StateId },
}
