//! # memento-app
//!
//! The application layer: configuration, the concrete menu wiring, and
//! the polling control loop tying buttons, clock, settings, and display
//! together.

pub mod app;
pub mod config;
pub mod menu;

pub use app::{App, AppError, Device};
pub use config::{Config, ConfigError};
pub use menu::{menu_event, ButtonKind, MenuEvent, Screen};
