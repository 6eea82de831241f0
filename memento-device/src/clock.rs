//! Adjustable wall clock and lifespan arithmetic.
//!
//! The appliance clock is kept as an offset from the host clock so the
//! setup menu can move individual fields without the rest of the system
//! caring where "now" comes from.

use crate::error::ClockError;
use crate::settings::days_in_month;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// A time-of-day field the setup menu can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Hour,
    Minute,
    Second,
}

impl TimeField {
    pub fn label(self) -> &'static str {
        match self {
            TimeField::Hour => "hour",
            TimeField::Minute => "minute",
            TimeField::Second => "second",
        }
    }
}

/// A calendar field the setup menu can adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
}

impl DateField {
    pub fn label(self) -> &'static str {
        match self {
            DateField::Year => "year",
            DateField::Month => "month",
            DateField::Day => "day",
        }
    }
}

/// Moves one time-of-day field a single step, wrapping within its range.
pub fn adjust_time(time: NaiveTime, field: TimeField, delta: i32) -> NaiveTime {
    if delta == 0 {
        return time;
    }
    let step = delta.signum();
    let (hour, minute, second) = (time.hour() as i32, time.minute() as i32, time.second() as i32);
    let (hour, minute, second) = match field {
        TimeField::Hour => ((hour + step).rem_euclid(24), minute, second),
        TimeField::Minute => (hour, (minute + step).rem_euclid(60), second),
        TimeField::Second => (hour, minute, (second + step).rem_euclid(60)),
    };
    NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32).unwrap_or(time)
}

/// Moves one calendar field a single step.
///
/// The month wraps December to January and back; the day wraps within the
/// month; the day is clamped when the year or month change shortens the
/// month. Returns `None` only when the result cannot be represented
/// (calendar range exceeded).
pub fn adjust_date(date: NaiveDate, field: DateField, delta: i32) -> Option<NaiveDate> {
    if delta == 0 {
        return Some(date);
    }
    let step = delta.signum();

    match field {
        DateField::Year => {
            let year = date.year() + step;
            let day = date.day().min(days_in_month(year, date.month()));
            NaiveDate::from_ymd_opt(year, date.month(), day)
        }
        DateField::Month => {
            let month = match (date.month(), step) {
                (12, 1) => 1,
                (1, -1) => 12,
                (month, step) => (month as i32 + step) as u32,
            };
            let day = date.day().min(days_in_month(date.year(), month));
            NaiveDate::from_ymd_opt(date.year(), month, day)
        }
        DateField::Day => {
            let last = days_in_month(date.year(), date.month());
            let day = match (date.day(), step) {
                (day, 1) if day >= last => 1,
                (1, -1) => last,
                (day, step) => (day as i32 + step) as u32,
            };
            NaiveDate::from_ymd_opt(date.year(), date.month(), day)
        }
    }
}

/// Days left until the birthday-plus-lifespan date; negative once the
/// expected lifespan has been exceeded.
///
/// A leap-day birthday clamps to February 28 in a non-leap target year.
pub fn remaining_days(birth: NaiveDate, lifespan_years: u32, today: NaiveDate) -> i64 {
    let year = birth.year() + lifespan_years as i32;
    let day = birth.day().min(days_in_month(year, birth.month()));
    let end = NaiveDate::from_ymd_opt(year, birth.month(), day).unwrap_or(NaiveDate::MAX);
    end.signed_duration_since(today).num_days()
}

/// The appliance clock.
#[derive(Debug)]
pub struct DeviceClock {
    offset: Duration,
    last_error: Option<ClockError>,
}

impl Default for DeviceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceClock {
    /// A clock tracking the host clock with no offset.
    pub fn new() -> Self {
        Self {
            offset: Duration::zero(),
            last_error: None,
        }
    }

    /// The current appliance date and time.
    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local() + self.offset
    }

    /// Sets the appliance clock to `target`.
    pub fn set(&mut self, target: NaiveDateTime) {
        self.offset = target.signed_duration_since(Local::now().naive_local());
    }

    /// Adjusts one time-of-day field a single step.
    pub fn adjust_time_field(&mut self, field: TimeField, delta: i32) {
        let now = self.now();
        let time = adjust_time(now.time(), field, delta);
        self.set(now.date().and_time(time));
    }

    /// Adjusts one calendar field a single step. An unrepresentable
    /// result leaves the clock unchanged and records the sticky error.
    pub fn adjust_date_field(&mut self, field: DateField, delta: i32) {
        let now = self.now();
        match adjust_date(now.date(), field, delta) {
            Some(date) => self.set(date.and_time(now.time())),
            None => {
                tracing::warn!(field = field.label(), "date adjustment not representable");
                self.last_error = Some(ClockError::AdjustOutOfRange);
            }
        }
    }

    /// The sticky last error, if any.
    pub fn last_error(&self) -> Option<&ClockError> {
        self.last_error.as_ref()
    }

    /// Clears the sticky last error.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_hour_wraps() {
        assert_eq!(adjust_time(time(23, 0, 0), TimeField::Hour, 1), time(0, 0, 0));
        assert_eq!(adjust_time(time(0, 0, 0), TimeField::Hour, -1), time(23, 0, 0));
    }

    #[test]
    fn test_minute_and_second_wrap() {
        assert_eq!(adjust_time(time(8, 59, 0), TimeField::Minute, 1), time(8, 0, 0));
        assert_eq!(adjust_time(time(8, 0, 59), TimeField::Second, 1), time(8, 0, 0));
        assert_eq!(adjust_time(time(8, 0, 0), TimeField::Second, -1), time(8, 0, 59));
    }

    #[test]
    fn test_zero_delta_is_a_no_op() {
        assert_eq!(adjust_time(time(8, 15, 30), TimeField::Hour, 0), time(8, 15, 30));
        assert_eq!(
            adjust_date(date(2024, 5, 10), DateField::Day, 0),
            Some(date(2024, 5, 10))
        );
    }

    #[test]
    fn test_month_wraps_and_clamps_day() {
        assert_eq!(
            adjust_date(date(2023, 12, 15), DateField::Month, 1),
            Some(date(2023, 1, 15))
        );
        assert_eq!(
            adjust_date(date(2023, 3, 31), DateField::Month, -1),
            Some(date(2023, 2, 28))
        );
    }

    #[test]
    fn test_day_wraps_within_month() {
        assert_eq!(
            adjust_date(date(2023, 4, 30), DateField::Day, 1),
            Some(date(2023, 4, 1))
        );
        assert_eq!(
            adjust_date(date(2023, 4, 1), DateField::Day, -1),
            Some(date(2023, 4, 30))
        );
    }

    #[test]
    fn test_year_step_clamps_leap_day() {
        assert_eq!(
            adjust_date(date(2024, 2, 29), DateField::Year, 1),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn test_remaining_days() {
        let birth = date(2000, 1, 1);
        assert_eq!(remaining_days(birth, 1, date(2000, 12, 31)), 1);
        assert_eq!(remaining_days(birth, 1, date(2001, 1, 1)), 0);
        assert_eq!(remaining_days(birth, 1, date(2001, 1, 3)), -2);
    }

    #[test]
    fn test_remaining_days_clamps_leap_birthday() {
        let birth = date(2000, 2, 29);
        // 2001 is not a leap year; the end date clamps to February 28.
        assert_eq!(remaining_days(birth, 1, date(2001, 2, 27)), 1);
    }

    #[test]
    fn test_clock_set_and_read() {
        let mut clock = DeviceClock::new();
        clock.set(date(2010, 6, 15).and_time(time(12, 0, 0)));

        let now = clock.now();
        assert_eq!(now.date(), date(2010, 6, 15));
        assert_eq!(now.time().hour(), 12);
    }

    #[test]
    fn test_clock_field_adjustment() {
        let mut clock = DeviceClock::new();
        clock.set(date(2010, 6, 15).and_time(time(12, 30, 0)));

        clock.adjust_time_field(TimeField::Hour, 1);
        clock.adjust_date_field(DateField::Year, -1);

        let now = clock.now();
        assert_eq!(now.time().hour(), 13);
        assert_eq!(now.date().year(), 2009);
        assert!(clock.last_error().is_none());
    }
}
