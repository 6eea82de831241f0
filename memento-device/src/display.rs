//! Text page rendering.
//!
//! One [`Page`] value per menu screen, rendered as a handful of plain
//! text lines into any writer. The writer stands in for the panel
//! driver; pages carry data only, never collaborator handles.

use crate::clock::{DateField, TimeField};
use crate::error::DisplayError;
use crate::settings::Sex;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::io::Write;

const WIDTH: usize = 24;

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// The resting screen: date, time, days left.
    Base {
        now: NaiveDateTime,
        remaining_days: i64,
    },
    /// A top-level setup ring item.
    MenuItem { title: &'static str },
    /// Editing one time-of-day field.
    TimeField { field: TimeField, time: NaiveTime },
    /// Editing one clock calendar field.
    DateField { field: DateField, date: NaiveDate },
    /// Editing one birthday calendar field.
    BirthdayField { field: DateField, date: NaiveDate },
    /// Choosing the sex.
    SexSelect { sex: Sex },
    /// Choosing the expected lifespan.
    LifespanSelect { years: u32 },
    /// Reset confirmation prompt.
    ResetChoice { confirm: bool },
    /// Reset countdown.
    ResetCountdown { seconds_left: u32 },
    /// Sticky collaborator errors.
    Fault { messages: Vec<String> },
}

/// The panel driver: renders pages as text lines.
pub struct Display<W: Write> {
    out: W,
    last_error: Option<DisplayError>,
}

impl<W: Write> Display<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_error: None,
        }
    }

    /// Draws one page. A failed write is recorded as the sticky error.
    pub fn render(&mut self, page: &Page) -> Result<(), DisplayError> {
        match self.draw(page) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn draw(&mut self, page: &Page) -> Result<(), DisplayError> {
        writeln!(self.out, "+{:-<WIDTH$}+", "")?;
        match page {
            Page::Base {
                now,
                remaining_days,
            } => {
                self.line(&now.format("%a, %b %d %Y").to_string())?;
                self.line(&format!(
                    "{:02}:{:02}:{:02}",
                    now.hour(),
                    now.minute(),
                    now.second()
                ))?;
                self.line(&"-".repeat(WIDTH - 2))?;
                self.centered("remaining days")?;
                // Past the expected span the counter runs up, not down.
                if *remaining_days >= 0 {
                    self.centered(&format!("{}", remaining_days))?;
                } else {
                    self.centered(&format!("+{}", -remaining_days))?;
                }
            }
            Page::MenuItem { title } => {
                self.centered("setup")?;
                self.centered(title)?;
            }
            Page::TimeField { field, time } => {
                self.centered("set time")?;
                self.centered(&format!(
                    "{:02}:{:02}:{:02}",
                    time.hour(),
                    time.minute(),
                    time.second()
                ))?;
                self.centered(&format!("[{}]", field.label()))?;
            }
            Page::DateField { field, date } => {
                self.centered("set date")?;
                self.centered(&date.format("%Y-%m-%d").to_string())?;
                self.centered(&format!("[{}]", field.label()))?;
            }
            Page::BirthdayField { field, date } => {
                self.centered("set birthday")?;
                self.centered(&date.format("%Y-%m-%d").to_string())?;
                self.centered(&format!("[{}]", field.label()))?;
            }
            Page::SexSelect { sex } => {
                self.centered("set sex")?;
                self.centered(sex.label())?;
            }
            Page::LifespanSelect { years } => {
                self.centered("set lifespan")?;
                self.centered(&format!("{} years", years))?;
            }
            Page::ResetChoice { confirm } => {
                self.centered("reset all?")?;
                if *confirm {
                    self.centered("> yes <")?;
                } else {
                    self.centered("> no <")?;
                }
            }
            Page::ResetCountdown { seconds_left } => {
                self.centered("resetting in")?;
                self.centered(&format!("{}", seconds_left))?;
            }
            Page::Fault { messages } => {
                self.centered("error")?;
                if messages.is_empty() {
                    self.centered("none")?;
                } else {
                    for message in messages {
                        self.line(message)?;
                    }
                }
            }
        }
        writeln!(self.out, "+{:-<WIDTH$}+", "")?;
        self.out.flush()?;
        Ok(())
    }

    fn line(&mut self, text: &str) -> Result<(), DisplayError> {
        writeln!(self.out, "|{:<WIDTH$}|", truncated(text))?;
        Ok(())
    }

    fn centered(&mut self, text: &str) -> Result<(), DisplayError> {
        writeln!(self.out, "|{:^WIDTH$}|", truncated(text))?;
        Ok(())
    }

    /// The sticky last error, if any.
    pub fn last_error(&self) -> Option<&DisplayError> {
        self.last_error.as_ref()
    }

    /// Clears the sticky last error.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Access to the underlying writer, for tests.
    pub fn writer(&self) -> &W {
        &self.out
    }
}

fn truncated(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(WIDTH)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    &text[..end]
}
