//! The month and year that goals and stats are reported for.

use serde::Deserialize;

use crate::{Error, timezone::local_today};

/// The earliest year accepted for a goal or stats period.
pub const MIN_YEAR: i32 = 1970;
/// The latest year accepted for a goal or stats period.
pub const MAX_YEAR: i32 = 9999;

/// A calendar month in a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// The month of the year, 1 to 12.
    pub month: u8,
    /// The four digit year.
    pub year: i32,
}

impl Period {
    /// Create a period, checking that the month and year are in range.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if `month` is not 1 to 12 or `year` is outside
    /// [MIN_YEAR] to [MAX_YEAR].
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::InvalidPeriod);
        }

        Ok(Self { month, year })
    }

    /// The current month and year in `local_timezone`.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn current(local_timezone: &str) -> Result<Self, Error> {
        let today = local_today(local_timezone)?;

        Ok(Self {
            month: today.month() as u8,
            year: today.year(),
        })
    }

    /// Resolve a period from optional raw `month` and `year` strings.
    ///
    /// Missing or blank parts fall back to the corresponding part of `current`.
    ///
    /// # Errors
    /// Returns [Error::InvalidPeriod] if a part is present but not a number, or the
    /// resulting period is out of range.
    pub fn resolve(
        month: Option<&str>,
        year: Option<&str>,
        current: Period,
    ) -> Result<Self, Error> {
        let month = match non_blank(month) {
            Some(month) => month.parse::<u8>().map_err(|_| Error::InvalidPeriod)?,
            None => current.month,
        };
        let year = match non_blank(year) {
            Some(year) => year.parse::<i32>().map_err(|_| Error::InvalidPeriod)?,
            None => current.year,
        };

        Self::new(month, year)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The query string for pages that show a single period.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// The month, 1 to 12.
    pub month: Option<String>,
    /// The four digit year.
    pub year: Option<String>,
}

impl PeriodQuery {
    /// Resolve the requested period, defaulting to the current period in `local_timezone`.
    pub fn resolve(&self, local_timezone: &str) -> Result<Period, Error> {
        let current = Period::current(local_timezone)?;

        Period::resolve(self.month.as_deref(), self.year.as_deref(), current)
    }
}
