use chrono::{Days, Months, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// ── Date helpers ────────────────────────────────────────────────────

/// Shift a date by a signed number of days, saturating at the ends of the
/// supported calendar.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Number of days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// ── Duration units ──────────────────────────────────────────────────

/// Calendar unit of a sentence term. Declaration order is the order the
/// units are applied when walking a calendar (largest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DurationUnit {
    Years,
    Months,
    Weeks,
    Days,
}

impl DurationUnit {
    /// Months and years have calendar-variable lengths.
    pub fn is_large(&self) -> bool {
        matches!(self, Self::Years | Self::Months)
    }
}

/// Which kind of units a duration is expressed in. Runs of the same family
/// are merged before day counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFamily {
    Large,
    Small,
    Mixed,
}

// ── Duration ────────────────────────────────────────────────────────

/// A sentence term expressed in calendar units, e.g. "2 years 6 months".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration {
    elements: BTreeMap<DurationUnit, u32>,
}

impl Duration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(amount: u32, unit: DurationUnit) -> Self {
        Self::new().with(amount, unit)
    }

    pub fn years(amount: u32) -> Self {
        Self::of(amount, DurationUnit::Years)
    }

    pub fn months(amount: u32) -> Self {
        Self::of(amount, DurationUnit::Months)
    }

    pub fn weeks(amount: u32) -> Self {
        Self::of(amount, DurationUnit::Weeks)
    }

    pub fn days(amount: u32) -> Self {
        Self::of(amount, DurationUnit::Days)
    }

    /// Builder: add `amount` of `unit` to this duration.
    pub fn with(mut self, amount: u32, unit: DurationUnit) -> Self {
        if amount > 0 {
            *self.elements.entry(unit).or_insert(0) += amount;
        }
        self
    }

    pub fn get(&self, unit: DurationUnit) -> u32 {
        self.elements.get(&unit).copied().unwrap_or(0)
    }

    pub fn elements(&self) -> &BTreeMap<DurationUnit, u32> {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.values().all(|v| *v == 0)
    }

    /// Add every element of `other` into this duration, unit by unit.
    pub fn append(&mut self, other: &Duration) {
        for (unit, amount) in &other.elements {
            if *amount > 0 {
                let total = self.elements.entry(*unit).or_insert(0);
                *total = total.saturating_add(*amount);
            }
        }
    }

    pub fn appended(&self, other: &Duration) -> Duration {
        let mut merged = self.clone();
        merged.append(other);
        merged
    }

    pub fn unit_family(&self) -> UnitFamily {
        let has_large = self.elements.iter().any(|(u, v)| *v > 0 && u.is_large());
        let has_small = self.elements.iter().any(|(u, v)| *v > 0 && !u.is_large());
        match (has_large, has_small) {
            (true, false) => UnitFamily::Large,
            (true, true) => UnitFamily::Mixed,
            _ => UnitFamily::Small,
        }
    }

    /// Last day of the term when it starts on `start`, or `None` when the
    /// term runs off the supported calendar.
    ///
    /// Years are applied before months so that a 29 February start clamps
    /// the same way a year-then-month calendar walk does.
    pub fn checked_end_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        let days = u64::from(self.get(DurationUnit::Weeks)) * 7 + u64::from(self.get(DurationUnit::Days));
        start
            .checked_add_months(Months::new(self.get(DurationUnit::Years).checked_mul(12)?))?
            .checked_add_months(Months::new(self.get(DurationUnit::Months)))?
            .checked_add_days(Days::new(days))?
            .checked_sub_days(Days::new(1))
    }

    /// [`Duration::checked_end_date`], saturating at the end of the calendar.
    pub fn end_date(&self, start: NaiveDate) -> NaiveDate {
        self.checked_end_date(start).unwrap_or(NaiveDate::MAX)
    }

    /// Number of days covered by the term when it starts on `start`.
    pub fn length_in_days(&self, start: NaiveDate) -> i64 {
        days_between(start, self.end_date(start)) + 1
    }

    /// Compare this term against `amount` of `unit`, both measured from `start`.
    pub fn compare_to(&self, amount: u32, unit: DurationUnit, start: NaiveDate) -> Ordering {
        self.length_in_days(start)
            .cmp(&Duration::of(amount, unit).length_in_days(start))
    }

    pub fn is_less_than(&self, amount: u32, unit: DurationUnit, start: NaiveDate) -> bool {
        self.compare_to(amount, unit, start) == Ordering::Less
    }

    pub fn is_at_least(&self, amount: u32, unit: DurationUnit, start: NaiveDate) -> bool {
        self.compare_to(amount, unit, start) != Ordering::Less
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0 days");
        }
        let parts: Vec<String> = self
            .elements
            .iter()
            .filter(|(_, v)| **v > 0)
            .map(|(unit, amount)| {
                let name = match unit {
                    DurationUnit::Years => "year",
                    DurationUnit::Months => "month",
                    DurationUnit::Weeks => "week",
                    DurationUnit::Days => "day",
                };
                if *amount == 1 {
                    format!("{} {}", amount, name)
                } else {
                    format!("{} {}s", amount, name)
                }
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
