//! Per-sentence calculation records and the booking-level result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::adjustment::AdjustmentWindow;
use crate::common::DateRange;
use crate::release_date::{DateBreakdown, ReleaseDateType};
use crate::sentence::Sentence;

// ── Sentence calculation ────────────────────────────────────────────

/// Dates computed for one sentence under one adjustment window. A new
/// value is produced on every recalculation; nothing is patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceCalculation {
    pub sentence_id: Uuid,
    pub window: AdjustmentWindow,

    pub number_of_days_to_sentence_expiry: i64,
    pub number_of_days_to_release: i64,
    /// Release point under the pre-early-release fraction; equal to
    /// `number_of_days_to_release` outside the 40% scheme.
    pub historic_release_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_days_to_licence_expiry: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_days_to_parole_eligibility: Option<i64>,

    pub deducted_days: i64,
    pub awarded_days: i64,
    pub unlawfully_at_large_days: i64,

    pub release_date_type: ReleaseDateType,
    pub unadjusted_release_date: NaiveDate,
    pub unadjusted_expiry_date: NaiveDate,
    /// Release after deductions and UAL but before additional days awarded.
    pub release_date_before_awarded: NaiveDate,
    pub adjusted_release_date: NaiveDate,
    pub adjusted_expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_licence_expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_parole_eligibility_date: Option<NaiveDate>,

    pub dates: BTreeMap<ReleaseDateType, NaiveDate>,
    pub breakdown: BTreeMap<ReleaseDateType, DateBreakdown>,
}

impl SentenceCalculation {
    /// Net movement applied to release: awarded + UAL - deducted.
    pub fn adjusted_days(&self) -> i64 {
        self.awarded_days + self.unlawfully_at_large_days - self.deducted_days
    }

    /// Net movement applied to expiry and licence dates (no awarded days).
    pub fn expiry_adjusted_days(&self) -> i64 {
        self.unlawfully_at_large_days - self.deducted_days
    }

    pub fn date(&self, release_date_type: ReleaseDateType) -> Option<NaiveDate> {
        self.dates.get(&release_date_type).copied()
    }

    /// Record a date together with its breakdown, replacing any previous
    /// value for that type.
    pub fn set_date(&mut self, release_date_type: ReleaseDateType, breakdown: DateBreakdown) {
        self.dates.insert(release_date_type, breakdown.release_date);
        self.breakdown.insert(release_date_type, breakdown);
    }

    pub fn remove_date(&mut self, release_date_type: ReleaseDateType) {
        self.dates.remove(&release_date_type);
        self.breakdown.remove(&release_date_type);
    }

    /// SLED or SED, whichever this sentence carries.
    pub fn expiry_date(&self) -> NaiveDate {
        self.date(ReleaseDateType::Sled)
            .or_else(|| self.date(ReleaseDateType::Sed))
            .unwrap_or(self.adjusted_expiry_date)
    }

    /// LED, or SLED when licence and sentence expire together.
    pub fn licence_expiry_date(&self) -> Option<NaiveDate> {
        self.date(ReleaseDateType::Led)
            .or_else(|| self.date(ReleaseDateType::Sled))
    }
}

/// An identified sentence paired with its latest calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedSentence {
    pub sentence: Sentence,
    pub calculation: SentenceCalculation,
}

impl CalculatedSentence {
    pub fn new(sentence: Sentence, calculation: SentenceCalculation) -> Self {
        Self {
            sentence,
            calculation,
        }
    }

    pub fn id(&self) -> Uuid {
        self.sentence.id
    }

    pub fn sentenced_at(&self) -> NaiveDate {
        self.sentence.sentenced_at
    }

    pub fn release_date(&self) -> NaiveDate {
        self.calculation.adjusted_release_date
    }

    pub fn release_date_type(&self) -> ReleaseDateType {
        self.calculation.release_date_type
    }

    /// Days spent in custody once every adjustment is applied.
    pub fn custodial_range(&self) -> DateRange {
        DateRange::new(self.sentenced_at(), self.release_date())
    }

    /// Custodial range used by the timeline walk: recalls run to expiry,
    /// everything else to release before additional days.
    pub fn walk_range(&self) -> DateRange {
        let end = if self.sentence.is_recall() {
            self.calculation.adjusted_expiry_date
        } else {
            self.calculation.release_date_before_awarded
        };
        DateRange::new(self.sentenced_at(), end)
    }
}

// ── Booking result ──────────────────────────────────────────────────

/// Overall length of custody, as a calendar period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSentenceLength {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub dates: BTreeMap<ReleaseDateType, NaiveDate>,
    pub breakdown_by_release_date_type: BTreeMap<ReleaseDateType, DateBreakdown>,
    pub effective_sentence_length: EffectiveSentenceLength,
    pub sentences_impacting_final_release_date: Vec<Uuid>,
}

impl CalculationResult {
    pub fn date(&self, release_date_type: ReleaseDateType) -> Option<NaiveDate> {
        self.dates.get(&release_date_type).copied()
    }
}
