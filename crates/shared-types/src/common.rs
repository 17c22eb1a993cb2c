use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::duration::add_days;

/// Inclusive date range (both `start` and `end` are days in the range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// True when the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when the ranges overlap or abut (one ends the day before the
    /// other starts).
    pub fn is_connected(&self, other: &DateRange) -> bool {
        self.start <= add_days(other.end, 1) && other.start <= add_days(self.end, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Smallest range covering both.
    pub fn span(&self, other: &DateRange) -> DateRange {
        DateRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Exact fraction used for release points (e.g. 2/3 of the custodial term).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    pub const WHOLE: Fraction = Fraction::new(1, 1);
    pub const HALF: Fraction = Fraction::new(1, 2);
    pub const TWO_FIFTHS: Fraction = Fraction::new(2, 5);
    pub const TWO_THIRDS: Fraction = Fraction::new(2, 3);
    pub const THREE_QUARTERS: Fraction = Fraction::new(3, 4);

    pub const fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `ceil(days * self)` using integer arithmetic. Negative day counts
    /// are treated as zero.
    pub fn ceil_of(&self, days: i64) -> i64 {
        if days <= 0 || self.denominator <= 0 {
            return 0;
        }
        (days * self.numerator + self.denominator - 1) / self.denominator
    }

    /// Compare by value (2/4 and 1/2 are equal).
    pub fn compare(&self, other: &Fraction) -> std::cmp::Ordering {
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }

    pub fn is_valid(&self) -> bool {
        self.denominator > 0 && self.numerator >= 0 && self.numerator <= self.denominator
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
