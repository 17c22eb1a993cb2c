//! Early removal scheme eligibility date (ERSED).
//!
//! The later of the release point of the custodial period and the maximum
//! removal period before release; never before the sentence date.

use shared_types::{
    add_days, CalculationRule, DateBreakdown, ErsedConfiguration, ReleaseDateType, Sentence,
    SentenceCalculation,
};

pub fn calculate_ersed(
    sentence: &Sentence,
    calculation: &SentenceCalculation,
    config: &ErsedConfiguration,
) -> Option<DateBreakdown> {
    if !sentence.has_release_date_type(ReleaseDateType::Ersed)
        || sentence.is_recall()
        || sentence.is_dto()
    {
        return None;
    }

    // Parole-eligible sentences are measured to the PED.
    let period = calculation
        .number_of_days_to_parole_eligibility
        .unwrap_or(calculation.historic_release_days);
    let release_point = config.release_point.ceil_of(period);
    let max_period_point = period - config.max_period_days;
    let (offset, rule) = if release_point >= max_period_point {
        (release_point, CalculationRule::ErsedOneHalfCustodialPeriod)
    } else {
        (max_period_point, CalculationRule::ErsedMaxPeriod)
    };

    let start = sentence.sentenced_at;
    let unadjusted = add_days(start, offset - 1);
    let adjusted_days = calculation.adjusted_days();
    let date = add_days(unadjusted, adjusted_days);
    if date < start {
        return Some(
            DateBreakdown::new(unadjusted, (start - unadjusted).num_days(), start)
                .with_rule(rule)
                .with_rule(CalculationRule::ErsedBeforeSentenceDate),
        );
    }
    Some(DateBreakdown::new(unadjusted, adjusted_days, date).with_rule(rule))
}
