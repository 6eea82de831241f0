//! The device context and the polling control loop.

use crate::config::Config;
use crate::menu::{self, ButtonKind, MenuEvent, Screen};
use memento_device::clock::{DateField, DeviceClock};
use memento_device::display::{Display, Page};
use memento_device::error::StoreError;
use memento_device::store::SettingsStore;
use memento_fsm::{Fsm, FsmError};
use memento_input::Press;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use thiserror::Error;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("state machine: {0}")]
    Fsm(#[from] FsmError),

    #[error("settings store: {0}")]
    Store(#[from] StoreError),
}

/// The collaborators shared by menu actions: clock, settings store,
/// display, and the reset-countdown scratch value.
///
/// Menu closures hold this behind `Rc<RefCell<..>>`; the machine itself
/// never sees it.
pub struct Device<W: Write> {
    pub clock: DeviceClock,
    pub store: SettingsStore,
    pub display: Display<W>,
    /// Remaining seconds of an armed factory-reset countdown.
    pub reset_countdown: u32,
    /// Value the countdown is armed with.
    pub countdown_start: u32,
}

impl<W: Write> Device<W> {
    pub fn new(store: SettingsStore, display: Display<W>, countdown_start: u32) -> Self {
        Self {
            clock: DeviceClock::new(),
            store,
            display,
            reset_countdown: 0,
            countdown_start,
        }
    }

    /// Renders a page. Failures end up in the display's sticky error and
    /// the log; callers inside menu actions have nowhere to propagate.
    pub fn show(&mut self, page: Page) {
        if let Err(err) = self.display.render(&page) {
            tracing::warn!(%err, "page render failed");
        }
    }

    /// Renders the resting screen from the current clock and settings.
    pub fn show_base(&mut self) {
        let page = menu::page_for(Screen::Base, self);
        self.show(page);
    }

    /// Adjusts one birthday field on the working settings copy.
    pub fn adjust_birthday(&mut self, field: DateField, delta: i32) {
        let settings = self.store.settings_mut();
        match field {
            DateField::Year => settings.adjust_birth_year(delta),
            DateField::Month => settings.adjust_birth_month(delta),
            DateField::Day => settings.adjust_birth_day(delta),
        }
    }

    /// True when any collaborator holds a sticky error.
    pub fn has_fault(&self) -> bool {
        self.store.last_error().is_some()
            || self.clock.last_error().is_some()
            || self.display.last_error().is_some()
    }

    /// The sticky collaborator errors, rendered on the fault page.
    pub fn fault_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(err) = self.store.last_error() {
            messages.push(err.to_string());
        }
        if let Some(err) = self.clock.last_error() {
            messages.push(err.to_string());
        }
        if let Some(err) = self.display.last_error() {
            messages.push(err.to_string());
        }
        messages
    }

    /// Clears every sticky collaborator error.
    pub fn clear_faults(&mut self) {
        self.store.clear_error();
        self.clock.clear_error();
        self.display.clear_error();
    }
}

/// The appliance: collaborators plus the wired menu machine.
pub struct App<W: Write> {
    device: Rc<RefCell<Device<W>>>,
    fsm: Fsm,
}

impl<W: Write + 'static> App<W> {
    /// Builds the appliance: loads (or initializes) the settings record,
    /// wires the menu, and renders the resting screen.
    pub fn new(config: &Config, out: W) -> Result<Self, AppError> {
        let mut store = SettingsStore::new(config.storage.settings_path());
        if !store.load()? {
            tracing::warn!("settings record was reset to defaults");
        }

        let display = Display::new(out);
        let device = Rc::new(RefCell::new(Device::new(
            store,
            display,
            config.ui.reset_countdown_secs,
        )));
        let fsm = menu::build_menu(&device)?;

        device.borrow_mut().show_base();
        Ok(Self { device, fsm })
    }

    /// The shared collaborator context.
    pub fn device(&self) -> &Rc<RefCell<Device<W>>> {
        &self.device
    }

    /// The active screen.
    pub fn screen(&self) -> Option<Screen> {
        self.fsm.current_state().and_then(Screen::from_state)
    }

    /// Redraws the active screen's page without dispatching anything.
    pub fn redraw(&mut self) {
        if let Some(screen) = self.screen() {
            let mut dev = self.device.borrow_mut();
            let page = menu::page_for(screen, &dev);
            dev.show(page);
        }
    }

    /// Feeds one classified button press into the menu machine. Returns
    /// whether a transition fired.
    pub fn handle_press(&mut self, button: ButtonKind, press: Press) -> Result<bool, AppError> {
        let event = menu::menu_event(button, press);
        tracing::debug!(button = button.label(), ?press, ?event, "button press");
        Ok(self.fsm.dispatch(event)?)
    }

    /// Once-per-second housekeeping: refreshes the resting screen and
    /// drives the reset countdown. All state changes still go through
    /// dispatch.
    pub fn tick(&mut self) -> Result<(), AppError> {
        match self.screen() {
            Some(Screen::Base) => {
                self.device.borrow_mut().show_base();
            }
            Some(Screen::ResetCountdown) => {
                let expired = {
                    let mut dev = self.device.borrow_mut();
                    if dev.reset_countdown > 0 {
                        dev.reset_countdown -= 1;
                    }
                    if dev.reset_countdown == 0 {
                        true
                    } else {
                        let page = Page::ResetCountdown {
                            seconds_left: dev.reset_countdown,
                        };
                        dev.show(page);
                        false
                    }
                };
                if expired {
                    // The device borrow must be released before dispatch;
                    // the transition hooks borrow it again.
                    if let Err(err) = self.device.borrow_mut().store.reset_defaults() {
                        tracing::error!(%err, "factory reset failed");
                    }
                    self.fsm.dispatch(MenuEvent::Ok)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
