//! The dispatcher: state registration and guarded event dispatch.

use crate::error::FsmError;
use crate::id::{EventId, StateId};
use crate::state::State;
use crate::transition::Transition;
use std::collections::HashMap;

/// A table-driven finite state machine.
///
/// The machine owns every registered [`State`], and each state owns its
/// outgoing [`Transition`]s; dropping the machine drops the whole table.
/// Registration is a one-time wiring phase; afterwards the only mutation
/// path is [`Fsm::dispatch`], which moves the single current state.
///
/// Dispatch cannot re-enter: it takes `&mut self`, so a guard or action
/// that somehow reached the machine again would be rejected at compile
/// time. Actions reach the outside world through whatever context they
/// captured at registration.
#[derive(Default)]
pub struct Fsm {
    states: HashMap<StateId, State>,
    current: Option<StateId>,
}

impl Fsm {
    /// Creates an empty machine with no current state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overwrites) a state and returns a builder scoped to
    /// it for attaching hooks and transitions.
    pub fn add_state(&mut self, id: impl Into<StateId>) -> StateBuilder<'_> {
        let id = id.into();
        self.states.insert(id, State::new(id));
        StateBuilder { fsm: self, id }
    }

    /// Sets the active state without invoking any enter hook.
    ///
    /// Used once at startup, before the first dispatch.
    pub fn set_current_state(&mut self, id: impl Into<StateId>) -> Result<(), FsmError> {
        let id = id.into();
        if !self.states.contains_key(&id) {
            return Err(FsmError::UnknownState { id });
        }
        self.current = Some(id);
        Ok(())
    }

    /// The currently active state, if one has been set.
    pub fn current_state(&self) -> Option<StateId> {
        self.current
    }

    /// Returns true if `id` names a registered state.
    pub fn has_state(&self, id: impl Into<StateId>) -> bool {
        self.states.contains_key(&id.into())
    }

    /// Looks up a registered state.
    pub fn state(&self, id: impl Into<StateId>) -> Option<&State> {
        self.states.get(&id.into())
    }

    /// Feeds one event to the machine.
    ///
    /// Returns `Ok(true)` when a transition fired, running exactly, and in
    /// order: the source's exit hook, the transition action, the state
    /// switch, the target's enter hook. Returns `Ok(false)` when the event
    /// was rejected - no transition registered for it, or its guard said
    /// no - in which case the source's stay hook runs once and the current
    /// state is unchanged. The two rejection causes are indistinguishable
    /// to the caller.
    ///
    /// A self-loop runs both exit and enter even though the id does not
    /// change, so re-entry can refresh whatever the state presents.
    ///
    /// Errors are reserved for wiring defects: dispatch before
    /// [`Fsm::set_current_state`], a current state that was never
    /// registered, or a transition whose target is unknown. The target is
    /// checked before any hook runs, so a defective transition has no
    /// partial effect.
    pub fn dispatch(&mut self, event: impl Into<EventId>) -> Result<bool, FsmError> {
        let event = event.into();
        let current = self.current.ok_or(FsmError::NoCurrentState)?;

        // A missing transition behaves exactly like one whose guard
        // evaluated false; the guard itself runs at most once.
        let target = {
            let state = self
                .states
                .get(&current)
                .ok_or(FsmError::UnknownState { id: current })?;
            state
                .transition(event)
                .and_then(|t| if t.fires() { Some(t.target()) } else { None })
        };

        let Some(target) = target else {
            if let Some(stay) = self
                .states
                .get_mut(&current)
                .and_then(|s| s.on_stay.as_mut())
            {
                stay();
            }
            tracing::trace!(state = %current, %event, "event rejected");
            return Ok(false);
        };

        if !self.states.contains_key(&target) {
            return Err(FsmError::UnknownTarget {
                from: current,
                target,
            });
        }

        if let Some(exit) = self
            .states
            .get_mut(&current)
            .and_then(|s| s.on_exit.as_mut())
        {
            exit();
        }

        if let Some(action) = self
            .states
            .get_mut(&current)
            .and_then(|s| s.transitions.get_mut(&event))
            .and_then(|t| t.action.as_mut())
        {
            action();
        }

        self.current = Some(target);

        if let Some(enter) = self
            .states
            .get_mut(&target)
            .and_then(|s| s.on_enter.as_mut())
        {
            enter();
        }

        tracing::trace!(from = %current, to = %target, %event, "transition fired");
        Ok(true)
    }
}

impl std::fmt::Debug for Fsm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fsm")
            .field("states", &self.states.len())
            .field("current", &self.current)
            .finish()
    }
}

/// Fluent builder scoped to one state.
///
/// Returned by [`Fsm::add_state`]; hooks and transitions attach to the
/// state being built, and [`StateBuilder::end`] hands the machine back so
/// the next state can be registered in the same chain.
pub struct StateBuilder<'a> {
    fsm: &'a mut Fsm,
    id: StateId,
}

impl<'a> StateBuilder<'a> {
    /// Sets the hook run after every transition into this state.
    pub fn on_enter(self, action: impl FnMut() + 'static) -> Self {
        if let Some(state) = self.fsm.states.get_mut(&self.id) {
            state.on_enter = Some(Box::new(action));
        }
        self
    }

    /// Sets the hook run when leaving this state.
    pub fn on_exit(self, action: impl FnMut() + 'static) -> Self {
        if let Some(state) = self.fsm.states.get_mut(&self.id) {
            state.on_exit = Some(Box::new(action));
        }
        self
    }

    /// Sets the hook run when an event is rejected in this state.
    pub fn on_stay(self, action: impl FnMut() + 'static) -> Self {
        if let Some(state) = self.fsm.states.get_mut(&self.id) {
            state.on_stay = Some(Box::new(action));
        }
        self
    }

    /// Registers (or replaces) the transition answering to `event`.
    pub fn on(self, event: impl Into<EventId>, transition: Transition) -> Self {
        if let Some(state) = self.fsm.states.get_mut(&self.id) {
            state.insert_transition(event.into(), transition);
        }
        self
    }

    /// Ends the chain, returning the owning machine.
    pub fn end(self) -> &'a mut Fsm {
        self.fsm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const BASE: StateId = StateId(0);
    const MENU: StateId = StateId(1);

    const SET: EventId = EventId(0);
    const PLUS: EventId = EventId(1);

    /// Shared call log for observing hook ordering.
    fn log() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnMut()>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let calls = calls.clone();
            move |tag: &'static str| -> Box<dyn FnMut()> {
                let calls = calls.clone();
                Box::new(move || calls.borrow_mut().push(tag))
            }
        };
        (calls, make)
    }

    #[test]
    fn test_no_match_returns_false_and_stays() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE).on_stay(hook("stay"));
        fsm.set_current_state(BASE).unwrap();

        for _ in 0..3 {
            assert_eq!(fsm.dispatch(SET).unwrap(), false);
            assert_eq!(fsm.current_state(), Some(BASE));
        }
        assert_eq!(*calls.borrow(), vec!["stay", "stay", "stay"]);
    }

    #[test]
    fn test_guard_false_behaves_like_no_match() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE)
            .on_stay(hook("stay"))
            .on(SET, Transition::to(MENU).when(|| false))
            .end()
            .add_state(MENU);
        fsm.set_current_state(BASE).unwrap();

        assert_eq!(fsm.dispatch(SET).unwrap(), false);
        assert_eq!(fsm.dispatch(SET).unwrap(), false);
        assert_eq!(fsm.current_state(), Some(BASE));
        assert_eq!(*calls.borrow(), vec!["stay", "stay"]);
    }

    #[test]
    fn test_transition_hook_ordering() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE)
            .on_exit(hook("exit-base"))
            .on(SET, Transition::to(MENU).run(hook("action")))
            .end()
            .add_state(MENU)
            .on_enter(hook("enter-menu"));
        fsm.set_current_state(BASE).unwrap();

        assert_eq!(fsm.dispatch(SET).unwrap(), true);
        assert_eq!(fsm.current_state(), Some(MENU));
        assert_eq!(*calls.borrow(), vec!["exit-base", "action", "enter-menu"]);
    }

    #[test]
    fn test_self_loop_fires_exit_and_enter() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE)
            .on_enter(hook("enter"))
            .on_exit(hook("exit"))
            .on(PLUS, Transition::to(BASE).run(hook("bump")));
        fsm.set_current_state(BASE).unwrap();

        assert_eq!(fsm.dispatch(PLUS).unwrap(), true);
        assert_eq!(fsm.current_state(), Some(BASE));
        assert_eq!(*calls.borrow(), vec!["exit", "bump", "enter"]);
    }

    #[test]
    fn test_default_neutrality() {
        // No guards, no actions anywhere: the bare transition always
        // fires and nothing observable happens besides the state switch.
        let mut fsm = Fsm::new();
        fsm.add_state(BASE)
            .on(SET, Transition::to(MENU))
            .end()
            .add_state(MENU);
        fsm.set_current_state(BASE).unwrap();

        assert_eq!(fsm.dispatch(SET).unwrap(), true);
        assert_eq!(fsm.current_state(), Some(MENU));
        assert_eq!(fsm.dispatch(PLUS).unwrap(), false);
        assert_eq!(fsm.current_state(), Some(MENU));
    }

    #[test]
    fn test_counter_scenario() {
        let counter = Rc::new(RefCell::new(0));

        let mut fsm = Fsm::new();
        let bump = {
            let counter = counter.clone();
            move || *counter.borrow_mut() += 1
        };
        fsm.add_state(BASE)
            .on(SET, Transition::to(MENU).when(|| true).run(bump))
            .end()
            .add_state(MENU);
        fsm.set_current_state(BASE).unwrap();

        assert_eq!(fsm.dispatch(SET).unwrap(), true);
        assert_eq!(*counter.borrow(), 1);
        assert_eq!(fsm.current_state(), Some(MENU));

        assert_eq!(fsm.dispatch(SET).unwrap(), false);
        assert_eq!(*counter.borrow(), 1);
        assert_eq!(fsm.current_state(), Some(MENU));
    }

    #[test]
    fn test_guard_evaluated_once_per_dispatch() {
        let evals = Rc::new(RefCell::new(0));

        let mut fsm = Fsm::new();
        let guard = {
            let evals = evals.clone();
            move || {
                *evals.borrow_mut() += 1;
                true
            }
        };
        fsm.add_state(BASE)
            .on(SET, Transition::to(MENU).when(guard))
            .end()
            .add_state(MENU);
        fsm.set_current_state(BASE).unwrap();

        fsm.dispatch(SET).unwrap();
        assert_eq!(*evals.borrow(), 1);
    }

    #[test]
    fn test_reregistering_transition_replaces() {
        let mut fsm = Fsm::new();
        fsm.add_state(BASE)
            .on(SET, Transition::to(BASE))
            .on(SET, Transition::to(MENU))
            .end()
            .add_state(MENU);
        fsm.set_current_state(BASE).unwrap();

        fsm.dispatch(SET).unwrap();
        assert_eq!(fsm.current_state(), Some(MENU));
    }

    #[test]
    fn test_reregistering_state_replaces() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE).on_stay(hook("old"));
        fsm.add_state(BASE).on_stay(hook("new"));
        fsm.set_current_state(BASE).unwrap();

        fsm.dispatch(SET).unwrap();
        assert_eq!(*calls.borrow(), vec!["new"]);
    }

    #[test]
    fn test_set_current_state_skips_enter_hook() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE).on_enter(hook("enter"));
        fsm.set_current_state(BASE).unwrap();

        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_dispatch_without_current_state() {
        let mut fsm = Fsm::new();
        fsm.add_state(BASE);

        assert_eq!(fsm.dispatch(SET), Err(FsmError::NoCurrentState));
    }

    #[test]
    fn test_set_current_state_unknown() {
        let mut fsm = Fsm::new();
        assert_eq!(
            fsm.set_current_state(MENU),
            Err(FsmError::UnknownState { id: MENU })
        );
    }

    #[test]
    fn test_unknown_target_has_no_partial_effect() {
        let (calls, hook) = log();

        let mut fsm = Fsm::new();
        fsm.add_state(BASE)
            .on_exit(hook("exit"))
            .on(SET, Transition::to(MENU).run(hook("action")));
        fsm.set_current_state(BASE).unwrap();

        assert_eq!(
            fsm.dispatch(SET),
            Err(FsmError::UnknownTarget {
                from: BASE,
                target: MENU,
            })
        );
        // Neither hook ran and the machine did not move.
        assert!(calls.borrow().is_empty());
        assert_eq!(fsm.current_state(), Some(BASE));
    }
}
