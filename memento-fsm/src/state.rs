//! State storage: hooks plus the per-state transition table.

use crate::id::{EventId, StateId};
use crate::transition::{Action, Transition};
use std::collections::HashMap;

/// A registered state: its enter/exit/stay hooks and the transitions it
/// owns, keyed by event.
pub struct State {
    id: StateId,
    pub(crate) on_enter: Option<Action>,
    pub(crate) on_exit: Option<Action>,
    pub(crate) on_stay: Option<Action>,
    pub(crate) transitions: HashMap<EventId, Transition>,
}

impl State {
    pub(crate) fn new(id: StateId) -> Self {
        Self {
            id,
            on_enter: None,
            on_exit: None,
            on_stay: None,
            transitions: HashMap::new(),
        }
    }

    /// This state's id.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Registers or replaces the transition answering to `event`.
    pub(crate) fn insert_transition(&mut self, event: EventId, transition: Transition) {
        self.transitions.insert(event, transition);
    }

    /// Looks up the transition for `event`, if one is registered.
    pub fn transition(&self, event: EventId) -> Option<&Transition> {
        self.transitions.get(&event)
    }

    /// Events this state answers to.
    pub fn events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.transitions.keys().copied()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}
