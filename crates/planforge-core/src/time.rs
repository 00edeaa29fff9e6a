//! Plan timeline types.
//!
//! A [`Date`] is a signed number of seconds on the plan timeline and a
//! [`TimePeriod`] a signed number of seconds between two dates. Arithmetic
//! saturates, so the infinite sentinels absorb any offset.

use std::fmt;
use std::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A point on the plan timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Date(i64);

impl Date {
    /// Earliest representable date.
    pub const INFINITE_PAST: Date = Date(i64::MIN);

    /// Latest representable date, used as the "no further availability"
    /// sentinel in replies.
    pub const INFINITE_FUTURE: Date = Date(i64::MAX);

    /// Creates a date from seconds.
    pub const fn from_seconds(seconds: i64) -> Self {
        Date(seconds)
    }

    /// Creates a date at the start of the given day.
    pub const fn from_days(days: i64) -> Self {
        Date(days * SECONDS_PER_DAY)
    }

    /// Returns the date as seconds.
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Returns the date as (fractional) days.
    pub fn days(self) -> f64 {
        self.0 as f64 / SECONDS_PER_DAY as f64
    }

    /// Returns true for either infinite sentinel.
    pub fn is_infinite(self) -> bool {
        self == Date::INFINITE_PAST || self == Date::INFINITE_FUTURE
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Date::INFINITE_PAST => write!(f, "infinite past"),
            Date::INFINITE_FUTURE => write!(f, "infinite future"),
            d if d.0 % SECONDS_PER_DAY == 0 => write!(f, "day {}", d.0 / SECONDS_PER_DAY),
            d => write!(f, "day {:.3}", d.days()),
        }
    }
}

/// A signed duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TimePeriod(i64);

impl TimePeriod {
    /// The empty period.
    pub const ZERO: TimePeriod = TimePeriod(0);

    /// A period too long to ever be exceeded.
    pub const INFINITE: TimePeriod = TimePeriod(i64::MAX);

    /// Creates a period from seconds.
    pub const fn seconds(seconds: i64) -> Self {
        TimePeriod(seconds)
    }

    /// Creates a period of whole days.
    pub const fn days(days: i64) -> Self {
        TimePeriod(days * SECONDS_PER_DAY)
    }

    /// Returns the period as seconds.
    pub const fn as_seconds(self) -> i64 {
        self.0
    }

    /// Returns the period as (fractional) days.
    pub fn as_days(self) -> f64 {
        self.0 as f64 / SECONDS_PER_DAY as f64
    }

    /// Returns true for a strictly positive period.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % SECONDS_PER_DAY == 0 {
            write!(f, "{}d", self.0 / SECONDS_PER_DAY)
        } else {
            write!(f, "{}s", self.0)
        }
    }
}

impl Add<TimePeriod> for Date {
    type Output = Date;

    fn add(self, rhs: TimePeriod) -> Date {
        if self.is_infinite() {
            return self;
        }
        Date(self.0.saturating_add(rhs.0))
    }
}

impl Sub<TimePeriod> for Date {
    type Output = Date;

    fn sub(self, rhs: TimePeriod) -> Date {
        if self.is_infinite() {
            return self;
        }
        Date(self.0.saturating_sub(rhs.0))
    }
}

impl Sub<Date> for Date {
    type Output = TimePeriod;

    fn sub(self, rhs: Date) -> TimePeriod {
        TimePeriod(self.0.saturating_sub(rhs.0))
    }
}

impl Add for TimePeriod {
    type Output = TimePeriod;

    fn add(self, rhs: TimePeriod) -> TimePeriod {
        TimePeriod(self.0.saturating_add(rhs.0))
    }
}
