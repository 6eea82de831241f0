//! # memento-input
//!
//! Debounced button sampling for memento.
//!
//! A [`Button`] consumes raw pin levels once per control-loop tick and
//! emits a [`Press`] classification when a stable press/release cycle
//! completes.

pub mod button;

pub use button::{Button, ButtonConfig, Press};
