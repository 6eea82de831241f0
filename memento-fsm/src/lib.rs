//! # memento-fsm
//!
//! Finite state machine engine for memento.
//!
//! This crate provides:
//! - Opaque state and event identifiers
//! - Transition registration with optional guards and actions
//! - A fluent per-state builder API
//! - Guarded, strictly ordered event dispatch

pub mod error;
pub mod id;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::FsmError;
pub use id::{EventId, StateId};
pub use machine::{Fsm, StateBuilder};
pub use state::State;
pub use transition::{Action, Guard, Transition};
