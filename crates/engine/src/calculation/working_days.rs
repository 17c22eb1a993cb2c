//! Non-working-day adjustment of release dates.
//!
//! Release dates that land on a weekend or bank holiday are brought forward
//! to the previous working day; eligibility dates move on to the next one.
//! Bank holiday data is supplied through [`BankHolidays`]; the built-in
//! England and Wales calendar computes the statutory list per year.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use shared_types::{CalculationResult, ReleaseDateType};
use std::collections::BTreeSet;

/// Lookup seam for bank holiday data.
pub trait BankHolidays {
    fn is_bank_holiday(&self, date: NaiveDate) -> bool;
}

impl BankHolidays for BTreeSet<NaiveDate> {
    fn is_bank_holiday(&self, date: NaiveDate) -> bool {
        self.contains(&date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankHoliday {
    pub date: NaiveDate,
    pub name: String,
}

/// Statutory England and Wales bank holidays, with one-off additions and
/// removals (royal occasions, moved holidays).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnglandAndWalesBankHolidays {
    additional: BTreeSet<NaiveDate>,
    removed: BTreeSet<NaiveDate>,
}

impl Default for EnglandAndWalesBankHolidays {
    /// The statutory calendar with the proclaimed changes since 2011.
    fn default() -> Self {
        let ymd = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        Self {
            additional: [
                ymd(2011, 4, 29),
                ymd(2012, 6, 4),
                ymd(2012, 6, 5),
                ymd(2020, 5, 8),
                ymd(2022, 6, 2),
                ymd(2022, 6, 3),
                ymd(2022, 9, 19),
                ymd(2023, 5, 8),
            ]
            .into_iter()
            .flatten()
            .collect(),
            removed: [ymd(2012, 5, 28), ymd(2020, 5, 4), ymd(2022, 5, 30)]
                .into_iter()
                .flatten()
                .collect(),
        }
    }
}

impl EnglandAndWalesBankHolidays {
    /// The statutory calendar only.
    pub fn statutory() -> Self {
        Self {
            additional: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    pub fn with_additional(mut self, date: NaiveDate) -> Self {
        self.additional.insert(date);
        self
    }

    pub fn without(mut self, date: NaiveDate) -> Self {
        self.removed.insert(date);
        self
    }

    /// All bank holidays in a year, in date order.
    pub fn holidays(&self, year: i32) -> Vec<BankHoliday> {
        let mut holidays = statutory_holidays(year);
        holidays.retain(|h| !self.removed.contains(&h.date));
        holidays.extend(
            self.additional
                .iter()
                .filter(|d| d.year() == year)
                .map(|d| BankHoliday {
                    date: *d,
                    name: "Additional bank holiday".to_string(),
                }),
        );
        holidays.sort_by_key(|h| h.date);
        holidays
    }
}

impl BankHolidays for EnglandAndWalesBankHolidays {
    fn is_bank_holiday(&self, date: NaiveDate) -> bool {
        if self.removed.contains(&date) {
            return false;
        }
        self.additional.contains(&date)
            || statutory_holidays(date.year()).iter().any(|h| h.date == date)
    }
}

// ── Statutory calendar ──────────────────────────────────────────────

fn statutory_holidays(year: i32) -> Vec<BankHoliday> {
    let mut holidays = Vec::new();
    let mut push = |date: Option<NaiveDate>, name: &str| {
        if let Some(date) = date {
            holidays.push(BankHoliday {
                date,
                name: name.to_string(),
            });
        }
    };

    // New Year's Day, substitute on the next weekday
    push(
        NaiveDate::from_ymd_opt(year, 1, 1).map(|d| substitute_day(d, &[])),
        "New Year's Day",
    );

    if let Some(easter) = easter_sunday(year) {
        push(easter.checked_sub_days(chrono::Days::new(2)), "Good Friday");
        push(easter.checked_add_days(chrono::Days::new(1)), "Easter Monday");
    }

    push(nth_weekday_of_month(year, 5, Weekday::Mon, 1), "Early May bank holiday");
    push(last_weekday_of_month(year, 5, Weekday::Mon), "Spring bank holiday");
    push(last_weekday_of_month(year, 8, Weekday::Mon), "Summer bank holiday");

    // Christmas and Boxing Day substitute onto the next free weekdays
    if let (Some(christmas), Some(boxing)) = (
        NaiveDate::from_ymd_opt(year, 12, 25),
        NaiveDate::from_ymd_opt(year, 12, 26),
    ) {
        let christmas = substitute_day(christmas, &[]);
        let boxing = substitute_day(boxing, &[christmas]);
        push(Some(christmas), "Christmas Day");
        push(Some(boxing), "Boxing Day");
    }

    holidays.sort_by_key(|h| h.date);
    holidays
}

/// First weekday on or after `date` not already taken.
fn substitute_day(date: NaiveDate, taken: &[NaiveDate]) -> NaiveDate {
    let mut current = date;
    while is_weekend(current) || taken.contains(&current) {
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Easter Sunday (anonymous Gregorian algorithm).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// The nth occurrence of a weekday in a month.
fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days_ahead = (weekday.num_days_from_monday() + 7
        - first_of_month.weekday().num_days_from_monday())
        % 7;
    NaiveDate::from_ymd_opt(year, month, 1 + days_ahead + (n - 1) * 7)
}

/// The last occurrence of a weekday in a month.
fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last_of_month = next_month.pred_opt()?;
    let days_back = (last_of_month.weekday().num_days_from_monday() + 7
        - weekday.num_days_from_monday())
        % 7;
    NaiveDate::from_ymd_opt(year, month, last_of_month.day() - days_back)
}

// ── Working days ────────────────────────────────────────────────────

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_working_day<H: BankHolidays + ?Sized>(date: NaiveDate, holidays: &H) -> bool {
    !is_weekend(date) && !holidays.is_bank_holiday(date)
}

pub fn previous_working_day<H: BankHolidays + ?Sized>(date: NaiveDate, holidays: &H) -> NaiveDate {
    let mut current = date;
    while !is_working_day(current, holidays) {
        match current.pred_opt() {
            Some(previous) => current = previous,
            None => break,
        }
    }
    current
}

pub fn next_working_day<H: BankHolidays + ?Sized>(date: NaiveDate, holidays: &H) -> NaiveDate {
    let mut current = date;
    while !is_working_day(current, holidays) {
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// A booking date moved off a weekend or bank holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonWorkingDayAdjustment {
    pub release_date_type: ReleaseDateType,
    pub date: NaiveDate,
    pub adjusted_date: NaiveDate,
}

/// Working-day adjustments for the release and eligibility dates of a
/// result. Dates already on a working day are not listed.
pub fn adjust_for_working_days<H: BankHolidays + ?Sized>(
    result: &CalculationResult,
    holidays: &H,
) -> Vec<NonWorkingDayAdjustment> {
    result
        .dates
        .iter()
        .filter_map(|(release_date_type, date)| {
            let adjusted = match release_date_type {
                ReleaseDateType::Crd
                | ReleaseDateType::Ard
                | ReleaseDateType::Prrd
                | ReleaseDateType::Mtd => previous_working_day(*date, holidays),
                ReleaseDateType::Hdced
                | ReleaseDateType::Hdced4Plus
                | ReleaseDateType::Ersed
                | ReleaseDateType::Ped => next_working_day(*date, holidays),
                _ => return None,
            };
            (adjusted != *date).then(|| NonWorkingDayAdjustment {
                release_date_type: *release_date_type,
                date: *date,
                adjusted_date: adjusted,
            })
        })
        .collect()
}
