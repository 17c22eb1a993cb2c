//! Remand overlap checks
//!
//! Overlaps indicate invalid source data and are never merged. Remand
//! against remand needs only the recorded periods, so it runs before any
//! sentence is calculated; remand against custody needs the walked
//! custodial ranges.

use shared_types::{AdjustmentType, Adjustments, CalculatedSentence, CalculationError, DateRange};

fn remand_periods(adjustments: &Adjustments) -> Vec<DateRange> {
    let mut periods = adjustments.periods(AdjustmentType::Remand);
    periods.sort_by_key(|p| (p.start, p.end));
    periods
}

/// Reject remand periods that overlap each other.
pub fn check_remand_overlaps_remand(adjustments: &Adjustments) -> Result<(), CalculationError> {
    let periods = remand_periods(adjustments);
    for (i, first) in periods.iter().enumerate() {
        if let Some(second) = periods[i + 1..].iter().find(|p| p.overlaps(first)) {
            return Err(CalculationError::RemandOverlapsRemand {
                first: *first,
                second: *second,
            });
        }
    }
    Ok(())
}

/// Reject remand periods that overlap a sentence's custodial period.
pub fn check_remand_overlaps_custody(
    adjustments: &Adjustments,
    sentences: &[CalculatedSentence],
) -> Result<(), CalculationError> {
    for remand in &remand_periods(adjustments) {
        if let Some(sentence) = sentences.iter().find(|s| s.custodial_range().overlaps(remand)) {
            return Err(CalculationError::RemandOverlapsSentence {
                remand: *remand,
                sentence_id: sentence.id(),
                sentence_range: sentence.custodial_range(),
            });
        }
    }
    Ok(())
}
