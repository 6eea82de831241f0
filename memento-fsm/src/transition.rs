//! Transition specification.

use crate::id::StateId;

/// Predicate deciding whether a transition fires.
///
/// Evaluated at most once per dispatch; implementations must not depend on
/// being called at all.
pub type Guard = Box<dyn Fn() -> bool>;

/// Side-effecting hook invoked by the dispatcher.
///
/// Actions may reach collaborator state captured at registration time but
/// must not re-enter the machine.
pub type Action = Box<dyn FnMut()>;

/// A transition rule: one destination state, an optional guard, and an
/// optional side effect.
///
/// A transition with no guard always fires; one with no action has no side
/// effect beyond the state switch. Each transition is owned by exactly one
/// state, keyed by the event it answers to.
pub struct Transition {
    pub(crate) target: StateId,
    pub(crate) guard: Option<Guard>,
    pub(crate) action: Option<Action>,
}

impl Transition {
    /// Starts a transition toward `target` with no guard and no action.
    pub fn to(target: impl Into<StateId>) -> Self {
        Self {
            target: target.into(),
            guard: None,
            action: None,
        }
    }

    /// Gates the transition on a predicate.
    pub fn when(mut self, guard: impl Fn() -> bool + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Attaches a side effect, run between the source's exit and the
    /// target's enter hooks.
    pub fn run(mut self, action: impl FnMut() + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// The destination state.
    pub fn target(&self) -> StateId {
        self.target
    }

    /// Evaluates the guard; a missing guard means "always fire".
    pub(crate) fn fires(&self) -> bool {
        self.guard.as_ref().map_or(true, |guard| guard())
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("target", &self.target)
            .field("guarded", &self.guard.is_some())
            .field("has_action", &self.action.is_some())
            .finish()
    }
}
