use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adjustment::Adjustments;
use crate::calculation::{CalculatedSentence, CalculationResult};
use crate::common::DateRange;
use crate::sentence::{Offender, Sentence};

/// Snapshot of everything needed to calculate one prisoner's release
/// dates. Built fresh for every request and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub offender: Offender,
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub adjustments: Adjustments,
    /// Date the prisoner was returned to custody after a fixed term recall.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to_custody_date: Option<NaiveDate>,
}

impl Booking {
    pub fn new(offender: Offender, sentences: Vec<Sentence>) -> Self {
        Self {
            offender,
            sentences,
            adjustments: Adjustments::default(),
            return_to_custody_date: None,
        }
    }

    pub fn with_adjustments(mut self, adjustments: Adjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn with_return_to_custody_date(mut self, date: NaiveDate) -> Self {
        self.return_to_custody_date = Some(date);
        self
    }

    pub fn sentence(&self, id: Uuid) -> Option<&Sentence> {
        self.sentences.iter().find(|s| s.id == id)
    }
}

/// Sentences sharing one unbroken custodial range, and therefore one set
/// of adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceGroup {
    pub range: DateRange,
    pub members: Vec<Uuid>,
    /// Adjustments attributed on or before this date belong to an earlier group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustments_after: Option<NaiveDate>,
    /// The prisoner was released between the previous group and this one.
    pub follows_release: bool,
}

/// Everything a booking calculation produced: the booking-level result
/// plus the per-sentence working used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub result: CalculationResult,
    pub sentences: Vec<CalculatedSentence>,
    pub groups: Vec<SentenceGroup>,
    /// Booking adjustments including entries appended by the timeline walk.
    pub adjustments: Adjustments,
    pub release_occurred: bool,
}

impl CalculationOutcome {
    pub fn sentence(&self, id: Uuid) -> Option<&CalculatedSentence> {
        self.sentences.iter().find(|s| s.id() == id)
    }
}
