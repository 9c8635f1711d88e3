//! Calendar bucket keys for day / week-of-month / month leaderboards
//!
//! Every key is derived from a local date only, so the same timestamp always
//! maps to the same three tables and historical buckets can be addressed
//! again by date.

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Leaderboard period as accepted at the read boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Period::Day),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            _ => None,
        }
    }

    pub fn all() -> [Period; 3] {
        [Period::Day, Period::Week, Period::Month]
    }

    /// Bucket this period falls into for the given date
    pub fn bucket_for(&self, date: NaiveDate) -> BucketKey {
        match self {
            Period::Day => BucketKey::day(date),
            Period::Week => BucketKey::week(date),
            Period::Month => BucketKey::month(date),
        }
    }
}

/// Identifier of one bucket table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Day(NaiveDate),
    Week { year: i32, month: u32, week: u32 },
    Month { year: i32, month: u32 },
}

impl BucketKey {
    pub fn day(date: NaiveDate) -> Self {
        BucketKey::Day(date)
    }

    pub fn week(date: NaiveDate) -> Self {
        BucketKey::Week {
            year: date.year(),
            month: date.month(),
            week: week_of_month(date),
        }
    }

    pub fn month(date: NaiveDate) -> Self {
        BucketKey::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The (day, week, month) triple a submission at `date` lands in
    pub fn current(date: NaiveDate) -> [BucketKey; 3] {
        [Self::day(date), Self::week(date), Self::month(date)]
    }

    pub fn period(&self) -> Period {
        match self {
            BucketKey::Day(_) => Period::Day,
            BucketKey::Week { .. } => Period::Week,
            BucketKey::Month { .. } => Period::Month,
        }
    }

    /// Table name, e.g. `day_2024_01_05`, `week_2024_01_02`, `month_2024_01`
    ///
    /// Output is restricted to `[a-z0-9_]`, which is what makes it safe to
    /// splice into SQL identifiers.
    pub fn table_name(&self) -> String {
        match self {
            BucketKey::Day(date) => format!(
                "day_{:04}_{:02}_{:02}",
                date.year(),
                date.month(),
                date.day()
            ),
            BucketKey::Week { year, month, week } => {
                format!("week_{:04}_{:02}_{:02}", year, month, week)
            }
            BucketKey::Month { year, month } => format!("month_{:04}_{:02}", year, month),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table_name())
    }
}

/// Calendar week index within the month, starting at 1
///
/// The weekday of the 1st is numbered Monday=1 .. Sunday=7 and the index is
/// `ceil((day + first_weekday - 2) / 7)`, floored at 1.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .map(|first| first.weekday().number_from_monday())
        .unwrap_or(1);

    let span = date.day() + first_weekday - 2;
    span.div_ceil(7).max(1)
}

pub fn day_key(date: NaiveDate) -> String {
    BucketKey::day(date).table_name()
}

pub fn week_key(date: NaiveDate) -> String {
    BucketKey::week(date).table_name()
}

pub fn month_key(date: NaiveDate) -> String {
    BucketKey::month(date).table_name()
}
