//! Calendar month arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month, written `YYYY-MM`.
///
/// Internally the first day of the month, so every derived date is valid by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    first: NaiveDate,
}

/// Error returned when parsing an invalid month string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month {0:?}: expected YYYY-MM")]
pub struct MonthParseError(pub String);

impl Month {
    /// Build a month from a year (1..=9999) and a month number (1..=12).
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=9999).contains(&year) {
            return Err(MonthParseError(format!("{year}-{month:02}")));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| MonthParseError(format!("{year:04}-{month:02}")))
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The month of today's local date.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn number(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(self) -> u32 {
        match self.number() {
            4 | 6 | 9 | 11 => 30,
            2 if self.first.leap_year() => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn last_day(self) -> NaiveDate {
        self.first + Days::new(u64::from(self.days_in_month() - 1))
    }

    /// Due date for a nominal day of month, clamped into this month.
    ///
    /// `due_day = 31` in a 30-day month lands on the 30th; it never spills
    /// into the next month. Days below 1 are treated as 1.
    pub fn due_date(self, due_day: u32) -> NaiveDate {
        let day = due_day.clamp(1, self.days_in_month());
        self.first + Days::new(u64::from(day - 1))
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    pub fn succ(self) -> Self {
        Self {
            first: self.first + Months::new(1),
        }
    }

    pub fn pred(self) -> Self {
        Self {
            first: self.first - Months::new(1),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.number())
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_owned());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).map_err(|_| err())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
