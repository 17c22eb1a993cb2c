//! Duration aggregation across consecutive terms.
//!
//! Runs of terms expressed in the same unit family (years/months, or
//! weeks/days) are merged into one block; a change of family starts a new
//! block. Day counts walk the blocks in order from a cursor date, so
//! "3 months then 10 days" depends on which months are spanned.

use chrono::NaiveDate;
use shared_types::{add_days, Duration, Sentence, UnitFamily};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationAggregator {
    blocks: Vec<Duration>,
}

impl DurationAggregator {
    /// Merge an ordered list of terms into unit-family blocks. Empty terms
    /// are dropped; mixed-unit terms always stand alone.
    pub fn aggregate(durations: &[Duration]) -> Self {
        let mut blocks: Vec<Duration> = Vec::new();
        for duration in durations.iter().filter(|d| !d.is_empty()) {
            let family = duration.unit_family();
            let merges = family != UnitFamily::Mixed
                && blocks.last().is_some_and(|current| current.unit_family() == family);
            if merges {
                if let Some(current) = blocks.last_mut() {
                    current.append(duration);
                    continue;
                }
            }
            blocks.push(duration.clone());
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Duration] {
        &self.blocks
    }

    /// Total days covered when the first block starts on `start`.
    pub fn calculate_days(&self, start: NaiveDate) -> i64 {
        let mut cursor = start;
        let mut total = 0;
        for block in &self.blocks {
            let days = block.length_in_days(cursor);
            total += days;
            cursor = add_days(cursor, days);
        }
        total
    }

    /// Last day covered when the first block starts on `start`, or `None`
    /// when the blocks run off the supported calendar.
    pub fn checked_end_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        let mut cursor = start;
        for block in &self.blocks {
            cursor = block.checked_end_date(cursor)?.succ_opt()?;
        }
        cursor.pred_opt()
    }

    /// Last day covered when the first block starts on `start`.
    pub fn end_date(&self, start: NaiveDate) -> NaiveDate {
        add_days(start, self.calculate_days(start) - 1)
    }
}

/// Days in custody for the sentence's custodial terms, from its sentence date.
pub fn custodial_days(sentence: &Sentence) -> i64 {
    DurationAggregator::aggregate(&sentence.custodial_durations()).calculate_days(sentence.sentenced_at)
}

/// Days to sentence expiry: custodial terms followed by any licence extension.
pub fn sentence_days(sentence: &Sentence) -> i64 {
    DurationAggregator::aggregate(&sentence.total_durations()).calculate_days(sentence.sentenced_at)
}
