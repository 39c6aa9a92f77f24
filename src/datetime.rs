//! Due and wait dates.
//!
//! A [`TaskDate`] is either a calendar day or a day plus a wall-clock
//! time, in local time. Day-only values are anchored at
//! [`DAY_BOUNDARY_HOUR`] instead of midnight so that something due
//! "today" is not overdue the moment the day starts.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Hour of day a date-only value resolves to.
pub const DAY_BOUNDARY_HOUR: u32 = 4;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_TIME_FORMAT_T: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskDate {
    at: NaiveDateTime,
    has_time: bool,
}

impl TaskDate {
    /// A date-only value at the day boundary.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            at: date.and_time(day_boundary()),
            has_time: false,
        }
    }

    /// A value with minute granularity.
    pub fn from_date_time(at: NaiveDateTime) -> Self {
        let at = at
            .with_second(0)
            .and_then(|at| at.with_nanosecond(0))
            .unwrap_or(at);
        Self { at, has_time: true }
    }

    /// Parse `YYYY-MM-DD`, `HH:MM` or `YYYY-MM-DD HH:MM` (a `T` separator is
    /// accepted too). A bare time is placed on the date of `now`.
    pub fn parse_at(value: &str, now: NaiveDateTime) -> Result<Self> {
        let value = value.trim();
        let invalid = || Error::InvalidDate(format!("'{value}' is not YYYY-MM-DD, HH:MM or YYYY-MM-DD HH:MM"));

        if value.contains(' ') || value.contains('T') {
            let format = if value.contains('T') {
                DATE_TIME_FORMAT_T
            } else {
                DATE_TIME_FORMAT
            };
            let at = NaiveDateTime::parse_from_str(value, format).map_err(|_| invalid())?;
            return Ok(Self::from_date_time(at));
        }
        if value.contains(':') {
            let time = NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| invalid())?;
            return Ok(Self::from_date_time(now.date().and_time(time)));
        }
        let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
        Ok(Self::from_date(date))
    }

    /// Like [`TaskDate::parse_at`] but also understands `today` and
    /// `tomorrow`, which resolve to date-only values.
    pub fn parse_relative(value: &str, now: NaiveDateTime) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::from_date(now.date())),
            "tomorrow" => Ok(Self::from_date(now.date() + Duration::days(1))),
            _ => Self::parse_at(value, now),
        }
    }

    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    pub fn has_time(&self) -> bool {
        self.has_time
    }

    /// True when the value lies strictly after `now`.
    pub fn is_after(&self, now: NaiveDateTime) -> bool {
        self.at > now
    }
}

fn day_boundary() -> NaiveTime {
    NaiveTime::from_hms_opt(DAY_BOUNDARY_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl fmt::Display for TaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_time {
            write!(f, "{}", self.at.format(DATE_TIME_FORMAT))
        } else {
            write!(f, "{}", self.at.format(DATE_FORMAT))
        }
    }
}

impl FromStr for TaskDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_at(s, Local::now().naive_local())
    }
}

impl Serialize for TaskDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
