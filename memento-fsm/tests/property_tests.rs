//! Property-based tests for the dispatcher.
//!
//! These tests use proptest to verify dispatch invariants across many
//! randomly generated event sequences.

use memento_fsm::{EventId, Fsm, StateId, Transition};
use proptest::prelude::*;

const STATES: [StateId; 3] = [StateId(0), StateId(1), StateId(2)];

/// A three-state ring: event 0 advances, event 1 goes back, event 2 is a
/// guarded self-loop that fires only on state 1. Events above 2 are never
/// registered.
fn ring() -> Fsm {
    let mut fsm = Fsm::new();
    fsm.add_state(STATES[0])
        .on(EventId(0), Transition::to(STATES[1]))
        .on(EventId(1), Transition::to(STATES[2]))
        .end()
        .add_state(STATES[1])
        .on(EventId(0), Transition::to(STATES[2]))
        .on(EventId(1), Transition::to(STATES[0]))
        .on(EventId(2), Transition::to(STATES[1]).when(|| true))
        .end()
        .add_state(STATES[2])
        .on(EventId(0), Transition::to(STATES[0]))
        .on(EventId(1), Transition::to(STATES[1]))
        .on(EventId(2), Transition::to(STATES[2]).when(|| false));
    fsm.set_current_state(STATES[0]).expect("initial state");
    fsm
}

proptest! {
    #[test]
    fn dispatch_is_total_on_wired_machines(events in prop::collection::vec(0..8u32, 0..64)) {
        let mut fsm = ring();
        for raw in events {
            // Unknown events are rejections, never errors.
            let outcome = fsm.dispatch(EventId(raw));
            prop_assert!(outcome.is_ok());
        }
    }

    #[test]
    fn current_state_stays_registered(events in prop::collection::vec(0..8u32, 0..64)) {
        let mut fsm = ring();
        for raw in events {
            fsm.dispatch(EventId(raw)).expect("wired machine");
            let current = fsm.current_state().expect("started machine");
            prop_assert!(STATES.contains(&current));
        }
    }

    #[test]
    fn rejected_events_never_move_the_machine(events in prop::collection::vec(3..8u32, 0..64)) {
        let mut fsm = ring();
        for raw in events {
            let fired = fsm.dispatch(EventId(raw)).expect("wired machine");
            prop_assert!(!fired);
            prop_assert_eq!(fsm.current_state(), Some(STATES[0]));
        }
    }
}
