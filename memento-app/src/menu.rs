//! Menu screens, events, and their transition wiring.
//!
//! Screens and events are plain enums whose discriminants double as the
//! machine's state and event ids. All behavior differences between
//! screens live in the closures registered here; there is no screen
//! class hierarchy.

use crate::app::Device;
use memento_device::clock::{DateField, TimeField};
use memento_device::display::Page;
use memento_fsm::{EventId, Fsm, FsmError, StateId, Transition};
use memento_input::Press;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// The menu screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Base,
    SetupTime,
    TimeHour,
    TimeMinute,
    TimeSecond,
    SetupDate,
    DateYear,
    DateMonth,
    DateDay,
    SetupBirthday,
    BirthdayYear,
    BirthdayMonth,
    BirthdayDay,
    SetupSex,
    SexSelect,
    SetupLifespan,
    LifespanSelect,
    SetupReset,
    ResetNo,
    ResetYes,
    ResetCountdown,
    SetupBack,
    Fault,
}

impl Screen {
    const ALL: [Screen; 23] = [
        Screen::Base,
        Screen::SetupTime,
        Screen::TimeHour,
        Screen::TimeMinute,
        Screen::TimeSecond,
        Screen::SetupDate,
        Screen::DateYear,
        Screen::DateMonth,
        Screen::DateDay,
        Screen::SetupBirthday,
        Screen::BirthdayYear,
        Screen::BirthdayMonth,
        Screen::BirthdayDay,
        Screen::SetupSex,
        Screen::SexSelect,
        Screen::SetupLifespan,
        Screen::LifespanSelect,
        Screen::SetupReset,
        Screen::ResetNo,
        Screen::ResetYes,
        Screen::ResetCountdown,
        Screen::SetupBack,
        Screen::Fault,
    ];

    /// Maps a machine state id back to its screen.
    pub fn from_state(id: StateId) -> Option<Screen> {
        Screen::ALL.iter().copied().find(|s| StateId::from(*s) == id)
    }

    /// A short name for logs and the simulator.
    pub fn name(self) -> &'static str {
        match self {
            Screen::Base => "base",
            Screen::SetupTime => "setup/time",
            Screen::TimeHour => "setup/time/hour",
            Screen::TimeMinute => "setup/time/minute",
            Screen::TimeSecond => "setup/time/second",
            Screen::SetupDate => "setup/date",
            Screen::DateYear => "setup/date/year",
            Screen::DateMonth => "setup/date/month",
            Screen::DateDay => "setup/date/day",
            Screen::SetupBirthday => "setup/birthday",
            Screen::BirthdayYear => "setup/birthday/year",
            Screen::BirthdayMonth => "setup/birthday/month",
            Screen::BirthdayDay => "setup/birthday/day",
            Screen::SetupSex => "setup/sex",
            Screen::SexSelect => "setup/sex/select",
            Screen::SetupLifespan => "setup/lifespan",
            Screen::LifespanSelect => "setup/lifespan/select",
            Screen::SetupReset => "setup/reset",
            Screen::ResetNo => "setup/reset/no",
            Screen::ResetYes => "setup/reset/yes",
            Screen::ResetCountdown => "setup/reset/countdown",
            Screen::SetupBack => "setup/back",
            Screen::Fault => "fault",
        }
    }
}

impl From<Screen> for StateId {
    fn from(screen: Screen) -> Self {
        StateId(screen as u32)
    }
}

/// The menu events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// Short SET press: cancel / up one level.
    Set,
    /// Long SET press: open the setup menu from the base screen.
    SetHold,
    Plus,
    Minus,
    Ok,
}

impl From<MenuEvent> for EventId {
    fn from(event: MenuEvent) -> Self {
        EventId(event as u32)
    }
}

/// The four physical buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Set,
    Plus,
    Minus,
    Ok,
}

impl ButtonKind {
    pub fn label(self) -> &'static str {
        match self {
            ButtonKind::Set => "SET",
            ButtonKind::Plus => "P",
            ButtonKind::Minus => "N",
            ButtonKind::Ok => "OK",
        }
    }
}

/// Translates a classified press into a menu event.
///
/// Short and long presses behave alike except on SET, whose long press is
/// the distinct menu-open event so stray taps never leave the base
/// screen.
pub fn menu_event(button: ButtonKind, press: Press) -> MenuEvent {
    match (button, press) {
        (ButtonKind::Set, Press::Long) => MenuEvent::SetHold,
        (ButtonKind::Set, Press::Short) => MenuEvent::Set,
        (ButtonKind::Plus, _) => MenuEvent::Plus,
        (ButtonKind::Minus, _) => MenuEvent::Minus,
        (ButtonKind::Ok, _) => MenuEvent::Ok,
    }
}

/// Builds the page a screen presents from the current collaborator state.
///
/// Shared by the enter hooks and the control loop's redraw path.
pub fn page_for<W: Write>(screen: Screen, dev: &Device<W>) -> Page {
    match screen {
        Screen::Base => {
            let now = dev.clock.now();
            let settings = dev.store.settings();
            Page::Base {
                now,
                remaining_days: memento_device::clock::remaining_days(
                    settings.birth_date(),
                    settings.lifespan_years(),
                    now.date(),
                ),
            }
        }
        Screen::SetupTime => Page::MenuItem { title: "time" },
        Screen::SetupDate => Page::MenuItem { title: "date" },
        Screen::SetupBirthday => Page::MenuItem { title: "birthday" },
        Screen::SetupSex => Page::MenuItem { title: "sex" },
        Screen::SetupLifespan => Page::MenuItem { title: "lifespan" },
        Screen::SetupReset => Page::MenuItem { title: "reset" },
        Screen::SetupBack => Page::MenuItem { title: "back" },
        Screen::TimeHour => Page::TimeField {
            field: TimeField::Hour,
            time: dev.clock.now().time(),
        },
        Screen::TimeMinute => Page::TimeField {
            field: TimeField::Minute,
            time: dev.clock.now().time(),
        },
        Screen::TimeSecond => Page::TimeField {
            field: TimeField::Second,
            time: dev.clock.now().time(),
        },
        Screen::DateYear => Page::DateField {
            field: DateField::Year,
            date: dev.clock.now().date(),
        },
        Screen::DateMonth => Page::DateField {
            field: DateField::Month,
            date: dev.clock.now().date(),
        },
        Screen::DateDay => Page::DateField {
            field: DateField::Day,
            date: dev.clock.now().date(),
        },
        Screen::BirthdayYear => Page::BirthdayField {
            field: DateField::Year,
            date: dev.store.settings().birth_date(),
        },
        Screen::BirthdayMonth => Page::BirthdayField {
            field: DateField::Month,
            date: dev.store.settings().birth_date(),
        },
        Screen::BirthdayDay => Page::BirthdayField {
            field: DateField::Day,
            date: dev.store.settings().birth_date(),
        },
        Screen::SexSelect => Page::SexSelect {
            sex: dev.store.settings().sex,
        },
        Screen::LifespanSelect => Page::LifespanSelect {
            years: dev.store.settings().lifespan_years(),
        },
        Screen::ResetNo => Page::ResetChoice { confirm: false },
        Screen::ResetYes => Page::ResetChoice { confirm: true },
        Screen::ResetCountdown => Page::ResetCountdown {
            seconds_left: dev.reset_countdown,
        },
        Screen::Fault => Page::Fault {
            messages: dev.fault_messages(),
        },
    }
}

/// An enter hook that redraws the screen's page.
fn enter_action<W: Write + 'static>(
    device: &Rc<RefCell<Device<W>>>,
    screen: Screen,
) -> impl FnMut() + 'static {
    let d = device.clone();
    move || {
        let mut dev = d.borrow_mut();
        let page = page_for(screen, &dev);
        dev.show(page);
    }
}

/// Wires the full menu and places the machine on the base screen.
pub fn build_menu<W: Write + 'static>(
    device: &Rc<RefCell<Device<W>>>,
) -> Result<Fsm, FsmError> {
    let mut fsm = Fsm::new();

    wire_base(&mut fsm, device);

    wire_ring_item(&mut fsm, device, Screen::SetupTime, Screen::SetupBack, Screen::SetupDate, Screen::TimeHour);
    wire_ring_item(&mut fsm, device, Screen::SetupDate, Screen::SetupTime, Screen::SetupBirthday, Screen::DateYear);
    wire_ring_item(&mut fsm, device, Screen::SetupBirthday, Screen::SetupDate, Screen::SetupSex, Screen::BirthdayYear);
    wire_ring_item(&mut fsm, device, Screen::SetupSex, Screen::SetupBirthday, Screen::SetupLifespan, Screen::SexSelect);
    wire_ring_item(&mut fsm, device, Screen::SetupLifespan, Screen::SetupSex, Screen::SetupReset, Screen::LifespanSelect);
    wire_ring_item(&mut fsm, device, Screen::SetupReset, Screen::SetupLifespan, Screen::SetupBack, Screen::ResetNo);

    wire_time_field(&mut fsm, device, Screen::TimeHour, TimeField::Hour, Screen::TimeMinute);
    wire_time_field(&mut fsm, device, Screen::TimeMinute, TimeField::Minute, Screen::TimeSecond);
    wire_time_field(&mut fsm, device, Screen::TimeSecond, TimeField::Second, Screen::SetupTime);

    wire_date_field(&mut fsm, device, Screen::DateYear, DateField::Year, Screen::DateMonth);
    wire_date_field(&mut fsm, device, Screen::DateMonth, DateField::Month, Screen::DateDay);
    wire_date_field(&mut fsm, device, Screen::DateDay, DateField::Day, Screen::SetupDate);

    wire_birthday_field(&mut fsm, device, Screen::BirthdayYear, DateField::Year, Screen::BirthdayMonth);
    wire_birthday_field(&mut fsm, device, Screen::BirthdayMonth, DateField::Month, Screen::BirthdayDay);
    wire_birthday_field(&mut fsm, device, Screen::BirthdayDay, DateField::Day, Screen::SetupBirthday);

    wire_sex_select(&mut fsm, device);
    wire_lifespan_select(&mut fsm, device);
    wire_reset_flow(&mut fsm, device);
    wire_back(&mut fsm, device);
    wire_fault(&mut fsm, device);

    fsm.set_current_state(Screen::Base)?;
    Ok(fsm)
}

fn wire_base<W: Write + 'static>(fsm: &mut Fsm, device: &Rc<RefCell<Device<W>>>) {
    let has_fault = {
        let d = device.clone();
        move || d.borrow().has_fault()
    };
    fsm.add_state(Screen::Base)
        .on_enter(enter_action(device, Screen::Base))
        .on(MenuEvent::SetHold, Transition::to(Screen::SetupTime))
        .on(MenuEvent::Ok, Transition::to(Screen::Fault).when(has_fault));
}

/// A top-level setup item: PLUS/MINUS rotate the ring, OK descends, SET
/// leaves the menu without saving.
fn wire_ring_item<W: Write + 'static>(
    fsm: &mut Fsm,
    device: &Rc<RefCell<Device<W>>>,
    screen: Screen,
    prev: Screen,
    next: Screen,
    descend: Screen,
) {
    fsm.add_state(screen)
        .on_enter(enter_action(device, screen))
        .on(MenuEvent::Plus, Transition::to(next))
        .on(MenuEvent::Minus, Transition::to(prev))
        .on(MenuEvent::Ok, Transition::to(descend))
        .on(MenuEvent::Set, Transition::to(Screen::Base));
}

/// A clock time-of-day editor. PLUS/MINUS are self-loops whose re-entry
/// redraws the page with the adjusted value.
fn wire_time_field<W: Write + 'static>(
    fsm: &mut Fsm,
    device: &Rc<RefCell<Device<W>>>,
    screen: Screen,
    field: TimeField,
    next: Screen,
) {
    let plus = {
        let d = device.clone();
        move || d.borrow_mut().clock.adjust_time_field(field, 1)
    };
    let minus = {
        let d = device.clone();
        move || d.borrow_mut().clock.adjust_time_field(field, -1)
    };
    fsm.add_state(screen)
        .on_enter(enter_action(device, screen))
        .on(MenuEvent::Plus, Transition::to(screen).run(plus))
        .on(MenuEvent::Minus, Transition::to(screen).run(minus))
        .on(MenuEvent::Ok, Transition::to(next))
        .on(MenuEvent::Set, Transition::to(Screen::SetupTime));
}

/// A clock calendar editor.
fn wire_date_field<W: Write + 'static>(
    fsm: &mut Fsm,
    device: &Rc<RefCell<Device<W>>>,
    screen: Screen,
    field: DateField,
    next: Screen,
) {
    let plus = {
        let d = device.clone();
        move || d.borrow_mut().clock.adjust_date_field(field, 1)
    };
    let minus = {
        let d = device.clone();
        move || d.borrow_mut().clock.adjust_date_field(field, -1)
    };
    fsm.add_state(screen)
        .on_enter(enter_action(device, screen))
        .on(MenuEvent::Plus, Transition::to(screen).run(plus))
        .on(MenuEvent::Minus, Transition::to(screen).run(minus))
        .on(MenuEvent::Ok, Transition::to(next))
        .on(MenuEvent::Set, Transition::to(Screen::SetupDate));
}

/// A birthday calendar editor, backed by the settings record.
fn wire_birthday_field<W: Write + 'static>(
    fsm: &mut Fsm,
    device: &Rc<RefCell<Device<W>>>,
    screen: Screen,
    field: DateField,
    next: Screen,
) {
    let plus = {
        let d = device.clone();
        move || d.borrow_mut().adjust_birthday(field, 1)
    };
    let minus = {
        let d = device.clone();
        move || d.borrow_mut().adjust_birthday(field, -1)
    };
    fsm.add_state(screen)
        .on_enter(enter_action(device, screen))
        .on(MenuEvent::Plus, Transition::to(screen).run(plus))
        .on(MenuEvent::Minus, Transition::to(screen).run(minus))
        .on(MenuEvent::Ok, Transition::to(next))
        .on(MenuEvent::Set, Transition::to(Screen::SetupBirthday));
}

fn wire_sex_select<W: Write + 'static>(fsm: &mut Fsm, device: &Rc<RefCell<Device<W>>>) {
    let toggle_up = {
        let d = device.clone();
        move || d.borrow_mut().store.settings_mut().toggle_sex()
    };
    let toggle_down = {
        let d = device.clone();
        move || d.borrow_mut().store.settings_mut().toggle_sex()
    };
    fsm.add_state(Screen::SexSelect)
        .on_enter(enter_action(device, Screen::SexSelect))
        .on(MenuEvent::Plus, Transition::to(Screen::SexSelect).run(toggle_up))
        .on(MenuEvent::Minus, Transition::to(Screen::SexSelect).run(toggle_down))
        .on(MenuEvent::Ok, Transition::to(Screen::SetupSex))
        .on(MenuEvent::Set, Transition::to(Screen::SetupSex));
}

fn wire_lifespan_select<W: Write + 'static>(fsm: &mut Fsm, device: &Rc<RefCell<Device<W>>>) {
    let below_cap = {
        let d = device.clone();
        move || d.borrow().store.settings().lifespan_years() < 120
    };
    let above_floor = {
        let d = device.clone();
        move || d.borrow().store.settings().lifespan_years() > 1
    };
    let plus = {
        let d = device.clone();
        move || d.borrow_mut().store.settings_mut().adjust_lifespan(1)
    };
    let minus = {
        let d = device.clone();
        move || d.borrow_mut().store.settings_mut().adjust_lifespan(-1)
    };
    fsm.add_state(Screen::LifespanSelect)
        .on_enter(enter_action(device, Screen::LifespanSelect))
        .on(
            MenuEvent::Plus,
            Transition::to(Screen::LifespanSelect).when(below_cap).run(plus),
        )
        .on(
            MenuEvent::Minus,
            Transition::to(Screen::LifespanSelect).when(above_floor).run(minus),
        )
        .on(MenuEvent::Ok, Transition::to(Screen::SetupLifespan))
        .on(MenuEvent::Set, Transition::to(Screen::SetupLifespan));
}

fn wire_reset_flow<W: Write + 'static>(fsm: &mut Fsm, device: &Rc<RefCell<Device<W>>>) {
    fsm.add_state(Screen::ResetNo)
        .on_enter(enter_action(device, Screen::ResetNo))
        .on(MenuEvent::Plus, Transition::to(Screen::ResetYes))
        .on(MenuEvent::Minus, Transition::to(Screen::ResetYes))
        .on(MenuEvent::Ok, Transition::to(Screen::SetupReset))
        .on(MenuEvent::Set, Transition::to(Screen::SetupReset));

    let arm = {
        let d = device.clone();
        move || {
            let mut dev = d.borrow_mut();
            dev.reset_countdown = dev.countdown_start;
        }
    };
    fsm.add_state(Screen::ResetYes)
        .on_enter(enter_action(device, Screen::ResetYes))
        .on(MenuEvent::Plus, Transition::to(Screen::ResetNo))
        .on(MenuEvent::Minus, Transition::to(Screen::ResetNo))
        .on(MenuEvent::Ok, Transition::to(Screen::ResetCountdown).run(arm))
        .on(MenuEvent::Set, Transition::to(Screen::SetupReset));

    fsm.add_state(Screen::ResetCountdown)
        .on_enter(enter_action(device, Screen::ResetCountdown))
        .on(MenuEvent::Ok, Transition::to(Screen::Base))
        .on(MenuEvent::Set, Transition::to(Screen::SetupReset));
}

fn wire_back<W: Write + 'static>(fsm: &mut Fsm, device: &Rc<RefCell<Device<W>>>) {
    let save = {
        let d = device.clone();
        move || {
            if d.borrow_mut().store.save().is_err() {
                tracing::warn!("settings not persisted on menu exit");
            }
        }
    };
    fsm.add_state(Screen::SetupBack)
        .on_enter(enter_action(device, Screen::SetupBack))
        .on(MenuEvent::Plus, Transition::to(Screen::SetupTime))
        .on(MenuEvent::Minus, Transition::to(Screen::SetupReset))
        .on(MenuEvent::Ok, Transition::to(Screen::Base).run(save))
        .on(MenuEvent::Set, Transition::to(Screen::Base));
}

fn wire_fault<W: Write + 'static>(fsm: &mut Fsm, device: &Rc<RefCell<Device<W>>>) {
    let clear = {
        let d = device.clone();
        move || d.borrow_mut().clear_faults()
    };
    fsm.add_state(Screen::Fault)
        .on_enter(enter_action(device, Screen::Fault))
        .on(MenuEvent::Ok, Transition::to(Screen::Base).run(clear))
        .on(MenuEvent::Set, Transition::to(Screen::Base));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_state_id_roundtrip() {
        for screen in Screen::ALL {
            assert_eq!(Screen::from_state(StateId::from(screen)), Some(screen));
        }
    }

    #[test]
    fn test_screen_ids_are_distinct() {
        for (i, a) in Screen::ALL.iter().enumerate() {
            for b in Screen::ALL.iter().skip(i + 1) {
                assert_ne!(StateId::from(*a), StateId::from(*b));
            }
        }
    }

    #[test]
    fn test_menu_event_mapping() {
        assert_eq!(menu_event(ButtonKind::Set, Press::Long), MenuEvent::SetHold);
        assert_eq!(menu_event(ButtonKind::Set, Press::Short), MenuEvent::Set);
        assert_eq!(menu_event(ButtonKind::Plus, Press::Long), MenuEvent::Plus);
        assert_eq!(menu_event(ButtonKind::Ok, Press::Short), MenuEvent::Ok);
    }
}
