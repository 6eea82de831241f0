//! The persisted profile: birth date, sex, expected lifespan.
//!
//! Birth date fields are held individually because the setup menu adjusts
//! them one at a time; the adjustment operations keep the triple valid
//! (month wraps December to January, the day wraps within the month and is
//! clamped when the month shrinks).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sex, selecting which lifespan default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Female,
    Male,
}

impl Sex {
    pub fn label(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

/// The settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub birth_year: i32,
    pub birth_month: u32,
    pub birth_day: u32,
    pub sex: Sex,
    /// Expected lifespan in years, per sex.
    pub lifespan_female: u32,
    pub lifespan_male: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            birth_year: 2000,
            birth_month: 1,
            birth_day: 1,
            sex: Sex::Female,
            lifespan_female: 82,
            lifespan_male: 77,
        }
    }
}

impl Settings {
    /// The birth date as a calendar date.
    pub fn birth_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.birth_year, self.birth_month, self.birth_day)
            .unwrap_or_default()
    }

    /// The expected lifespan for the configured sex, in years.
    pub fn lifespan_years(&self) -> u32 {
        match self.sex {
            Sex::Female => self.lifespan_female,
            Sex::Male => self.lifespan_male,
        }
    }

    /// Moves the birth year one step in the direction of `delta`.
    pub fn adjust_birth_year(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        self.birth_year += delta.signum();
        self.clamp_birth_day();
    }

    /// Moves the birth month one step, wrapping December and January.
    pub fn adjust_birth_month(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        self.birth_month = match (self.birth_month, delta.signum()) {
            (12, 1) => 1,
            (1, -1) => 12,
            (month, step) => (month as i32 + step) as u32,
        };
        self.clamp_birth_day();
    }

    /// Moves the birth day one step, wrapping within the month.
    pub fn adjust_birth_day(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        let last = days_in_month(self.birth_year, self.birth_month);
        self.birth_day = match (self.birth_day, delta.signum()) {
            (day, 1) if day >= last => 1,
            (1, -1) => last,
            (day, step) => (day as i32 + step) as u32,
        };
    }

    /// Switches between the two sexes.
    pub fn toggle_sex(&mut self) {
        self.sex = match self.sex {
            Sex::Female => Sex::Male,
            Sex::Male => Sex::Female,
        };
    }

    /// Bumps the lifespan of the configured sex one year in the direction
    /// of `delta`.
    pub fn adjust_lifespan(&mut self, delta: i32) {
        if delta == 0 {
            return;
        }
        let span = match self.sex {
            Sex::Female => &mut self.lifespan_female,
            Sex::Male => &mut self.lifespan_male,
        };
        if delta > 0 {
            *span += 1;
        } else if *span > 1 {
            *span -= 1;
        }
    }

    fn clamp_birth_day(&mut self) {
        let last = days_in_month(self.birth_year, self.birth_month);
        if self.birth_day > last {
            self.birth_day = last;
        }
    }
}

/// Number of days in the given month: the day before the first of the
/// following month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.birth_date(), NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!(settings.sex, Sex::Female);
        assert_eq!(settings.lifespan_years(), 82);
    }

    #[test]
    fn test_month_wraps_both_ways() {
        let mut settings = Settings::default();
        settings.birth_month = 12;
        settings.adjust_birth_month(1);
        assert_eq!(settings.birth_month, 1);

        settings.adjust_birth_month(-1);
        assert_eq!(settings.birth_month, 12);
    }

    #[test]
    fn test_day_wraps_within_month() {
        let mut settings = Settings {
            birth_year: 2001,
            birth_month: 4,
            birth_day: 30,
            ..Settings::default()
        };
        settings.adjust_birth_day(1);
        assert_eq!(settings.birth_day, 1);

        settings.adjust_birth_day(-1);
        assert_eq!(settings.birth_day, 30);
    }

    #[test]
    fn test_day_clamped_when_month_shrinks() {
        let mut settings = Settings {
            birth_year: 2001,
            birth_month: 3,
            birth_day: 31,
            ..Settings::default()
        };
        // March 31 backwards into February.
        settings.adjust_birth_month(-1);
        assert_eq!(settings.birth_month, 2);
        assert_eq!(settings.birth_day, 28);
    }

    #[test]
    fn test_leap_day_clamped_on_year_change() {
        let mut settings = Settings {
            birth_year: 2000,
            birth_month: 2,
            birth_day: 29,
            ..Settings::default()
        };
        settings.adjust_birth_year(1);
        assert_eq!(settings.birth_year, 2001);
        assert_eq!(settings.birth_day, 28);
    }

    #[test]
    fn test_lifespan_follows_sex() {
        let mut settings = Settings::default();
        settings.adjust_lifespan(1);
        assert_eq!(settings.lifespan_female, 83);
        assert_eq!(settings.lifespan_male, 77);

        settings.toggle_sex();
        assert_eq!(settings.lifespan_years(), 77);
        settings.adjust_lifespan(-1);
        assert_eq!(settings.lifespan_male, 76);
        assert_eq!(settings.lifespan_female, 83);
    }

    #[test]
    fn test_lifespan_never_reaches_zero() {
        let mut settings = Settings {
            lifespan_female: 1,
            ..Settings::default()
        };
        settings.adjust_lifespan(-1);
        assert_eq!(settings.lifespan_female, 1);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2001, 1), 31);
        assert_eq!(days_in_month(2001, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2001, 4), 30);
        assert_eq!(days_in_month(2001, 12), 31);
    }
}
