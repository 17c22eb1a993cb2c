use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::DateRange;
use crate::duration::add_days;

/// Kinds of adjustment that move a sentence's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    Remand,
    TaggedBail,
    AdditionalDaysAwarded,
    RestorationOfAdditionalDaysAwarded,
    UnlawfullyAtLarge,
}

impl AdjustmentType {
    /// Days credited against the sentence (time already served).
    pub const DEDUCTIONS: [AdjustmentType; 2] = [Self::Remand, Self::TaggedBail];
}

/// Where an adjustment entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentSource {
    /// Supplied by the adjustments service.
    #[default]
    Recorded,
    /// Added by the timeline walk to record awarded days that bridged a
    /// gap between sentences. Never counted towards a sentence's totals.
    TimelineGapFill,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Adjustment {
    pub number_of_days: i64,
    /// Sentence date (or, for awarded days, adjudication date) the entry is
    /// attributed to.
    pub applies_to_sentences_from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: AdjustmentSource,
}

impl Adjustment {
    pub fn new(number_of_days: i64, applies_to_sentences_from: NaiveDate) -> Self {
        Self {
            number_of_days,
            applies_to_sentences_from,
            from_date: None,
            to_date: None,
            source: AdjustmentSource::Recorded,
        }
    }

    /// An entry covering an inclusive period; the day count is derived
    /// from the period.
    pub fn for_period(from: NaiveDate, to: NaiveDate, applies_to_sentences_from: NaiveDate) -> Self {
        Self {
            number_of_days: (to - from).num_days() + 1,
            applies_to_sentences_from,
            from_date: Some(from),
            to_date: Some(to),
            source: AdjustmentSource::Recorded,
        }
    }

    pub fn period(&self) -> Option<DateRange> {
        match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => Some(DateRange::new(from, to)),
            _ => None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.source == AdjustmentSource::Recorded
    }
}

/// Half-open attribution window `(after, before]` over
/// `applies_to_sentences_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjustmentWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<NaiveDate>,
    pub before: NaiveDate,
}

impl AdjustmentWindow {
    pub fn new(after: Option<NaiveDate>, before: NaiveDate) -> Self {
        Self { after, before }
    }

    /// Window selecting only entries attributed to the sentence date itself.
    pub fn for_sentence(sentenced_at: NaiveDate) -> Self {
        Self {
            after: Some(add_days(sentenced_at, -1)),
            before: sentenced_at,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date <= self.before && self.after.map_or(true, |after| date > after)
    }
}

/// Adjustments for a booking, keyed by type. Entries are only ever
/// appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Adjustments {
    entries: BTreeMap<AdjustmentType, Vec<Adjustment>>,
}

impl Adjustments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, adjustment_type: AdjustmentType, adjustment: Adjustment) {
        self.entries.entry(adjustment_type).or_default().push(adjustment);
    }

    /// Builder form of [`Adjustments::add`].
    pub fn with(mut self, adjustment_type: AdjustmentType, adjustment: Adjustment) -> Self {
        self.add(adjustment_type, adjustment);
        self
    }

    pub fn get(&self, adjustment_type: AdjustmentType) -> &[Adjustment] {
        self.entries
            .get(&adjustment_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of recorded days of the given types inside the window.
    pub fn total(&self, types: &[AdjustmentType], window: &AdjustmentWindow) -> i64 {
        types
            .iter()
            .flat_map(|t| self.get(*t))
            .filter(|a| a.is_recorded() && window.contains(a.applies_to_sentences_from))
            .map(|a| a.number_of_days)
            .sum()
    }

    /// Remand plus tagged bail.
    pub fn deducted_days(&self, window: &AdjustmentWindow) -> i64 {
        self.total(&AdjustmentType::DEDUCTIONS, window)
    }

    /// Additional days awarded net of restorations, never negative.
    pub fn awarded_days(&self, window: &AdjustmentWindow) -> i64 {
        let awarded = self.total(&[AdjustmentType::AdditionalDaysAwarded], window);
        let restored = self.total(&[AdjustmentType::RestorationOfAdditionalDaysAwarded], window);
        (awarded - restored).max(0)
    }

    /// Additional days already spent bridging timeline gaps in the window.
    pub fn gap_filled_days(&self, window: &AdjustmentWindow) -> i64 {
        self.get(AdjustmentType::AdditionalDaysAwarded)
            .iter()
            .filter(|a| a.source == AdjustmentSource::TimelineGapFill)
            .filter(|a| window.contains(a.applies_to_sentences_from))
            .map(|a| a.number_of_days)
            .sum()
    }

    pub fn unlawfully_at_large_days(&self, window: &AdjustmentWindow) -> i64 {
        self.total(&[AdjustmentType::UnlawfullyAtLarge], window)
    }

    /// Periods of all recorded entries of a type that carry from/to dates.
    pub fn periods(&self, adjustment_type: AdjustmentType) -> Vec<DateRange> {
        self.get(adjustment_type)
            .iter()
            .filter(|a| a.is_recorded())
            .filter_map(Adjustment::period)
            .collect()
    }
}
