//! Post-recall release date (PRRD)
//!
//! Standard recalls serve to sentence expiry. Fixed term recalls serve a
//! short or long fixed period from return to custody, depending on the
//! length of the original term, and never past expiry.

use chrono::NaiveDate;
use shared_types::{
    add_days, CalculationError, CalculationRule, DateBreakdown, Duration,
    FixedTermRecallConfiguration, RecallType, Sentence, SentenceCalculation,
};

use super::duration_aggregator::custodial_days;

pub fn calculate_prrd(
    sentence: &Sentence,
    calculation: &SentenceCalculation,
    return_to_custody_date: Option<NaiveDate>,
    config: &FixedTermRecallConfiguration,
) -> Result<Option<DateBreakdown>, CalculationError> {
    let expiry = calculation.adjusted_expiry_date;
    match sentence.recall_type {
        None => Ok(None),
        Some(RecallType::StandardRecall) => Ok(Some(
            DateBreakdown::new(
                calculation.unadjusted_expiry_date,
                calculation.expiry_adjusted_days(),
                expiry,
            )
            .with_rule(CalculationRule::PrrdStandardRecall),
        )),
        Some(RecallType::FixedTermRecall) => {
            let returned = return_to_custody_date.ok_or(CalculationError::MissingReturnToCustodyDate {
                sentence_id: sentence.id,
            })?;
            let threshold = Duration::months(config.duration_threshold_months)
                .length_in_days(sentence.sentenced_at);
            let (days, rule) = if custodial_days(sentence) < threshold {
                (config.short_recall_days, CalculationRule::PrrdFixedTermShort)
            } else {
                (config.long_recall_days, CalculationRule::PrrdFixedTermLong)
            };
            let date = add_days(returned, days - 1);
            if date > expiry {
                return Ok(Some(
                    DateBreakdown::new(date, (expiry - date).num_days(), expiry)
                        .with_rule(rule)
                        .with_rule(CalculationRule::PrrdCappedAtExpiry),
                ));
            }
            Ok(Some(DateBreakdown::new(date, 0, date).with_rule(rule)))
        }
    }
}
