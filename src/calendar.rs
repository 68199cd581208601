//! 365-day ("noleap") calendar arithmetic.
//!
//! Every generated time axis uses this calendar: twelve months with fixed
//! lengths and no leap day.

use std::fmt;

/// Days in each month of the no-leap calendar
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days in a no-leap year
pub const DAYS_PER_YEAR: u32 = 365;

/// A timestamp in the no-leap calendar with hour resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoLeapDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl NoLeapDateTime {
    /// Midnight on the given date
    pub const fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
        }
    }

    pub const fn ymdh(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
        }
    }

    /// Zero-based day of year
    pub fn day_of_year(&self) -> u32 {
        let before: u32 = DAYS_IN_MONTH[..(self.month - 1) as usize].iter().sum();
        before + self.day - 1
    }

    /// Hours elapsed since `base_year`-01-01 00:00.
    ///
    /// Hours are allowed to overflow past 23; the synthetic hourly axis relies on
    /// this for its closing `(end_year, 1, 1, dhour)` boundary.
    pub fn hours_since_year(&self, base_year: i32) -> i64 {
        let days = (self.year - base_year) as i64 * DAYS_PER_YEAR as i64
            + self.day_of_year() as i64;
        days * 24 + self.hour as i64
    }

    /// Fractional days elapsed since `base_year`-01-01
    pub fn days_since_year(&self, base_year: i32) -> f64 {
        self.hours_since_year(base_year) as f64 / 24.0
    }

    /// YYYYMMDD integer encoding
    pub fn yyyymmdd(&self) -> i32 {
        self.year * 10_000 + self.month as i32 * 100 + self.day as i32
    }
}

impl fmt::Display for NoLeapDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:00:00",
            self.year, self.month, self.day, self.hour
        )
    }
}

/// Every calendar date of a no-leap year, in order
pub fn days_of_year(year: i32) -> impl Iterator<Item = NoLeapDateTime> {
    DAYS_IN_MONTH
        .iter()
        .enumerate()
        .flat_map(move |(m, &ndays)| (1..=ndays).map(move |d| NoLeapDateTime::ymd(year, m as u32 + 1, d)))
}

/// Parse the year out of a `"<unit> since YYYY-MM-DD"` string
pub fn reference_year(units: &str) -> Option<i32> {
    let (_, date) = units.split_once(" since ")?;
    let year = date.trim().split('-').next()?;
    year.parse().ok()
}
