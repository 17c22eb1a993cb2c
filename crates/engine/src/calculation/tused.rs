//! Top-up supervision expiry date (TUSED).
//!
//! Short sentences get a fixed supervision period after release. The date
//! is only reported when it outlasts the licence.

use chrono::Months;
use shared_types::{
    CalculationRule, DateBreakdown, ReleaseDateType, Sentence, SentenceCalculation,
    TusedConfiguration,
};

/// Release before additional days plus the supervision period, or `None`
/// when the sentence does not qualify.
pub fn calculate_tused(
    sentence: &Sentence,
    calculation: &SentenceCalculation,
    config: &TusedConfiguration,
) -> Option<DateBreakdown> {
    if !sentence.has_release_date_type(ReleaseDateType::Tused) {
        return None;
    }
    let months = Months::new(config.supervision_months);
    let unadjusted = calculation.unadjusted_release_date.checked_add_months(months)?;
    let date = calculation.release_date_before_awarded.checked_add_months(months)?;

    if let Some(licence_expiry) = calculation.licence_expiry_date() {
        if date <= licence_expiry {
            return None;
        }
    }
    Some(
        DateBreakdown::new(unadjusted, (date - unadjusted).num_days(), date)
            .with_rule(CalculationRule::TusedLicencePeriodLtOneYear),
    )
}
