//! HDCED under the four-year-plus scheme. Unlike the standard HDCED it is
//! measured on the actual (possibly early-release) custodial period,
//! excludes schedule 15 offences, and is floored at the minimum custodial
//! period rather than the minimum days on HDC.

use shared_types::{
    add_days, CalculationRule, DateBreakdown, Fraction, Hdced4PlusConfiguration, Offender,
    ReleaseDateType, Sentence, SentenceCalculation,
};

pub fn calculate_hdced4plus(
    sentence: &Sentence,
    calculation: &SentenceCalculation,
    offender: &Offender,
    config: &Hdced4PlusConfiguration,
) -> Option<DateBreakdown> {
    if !sentence.has_release_date_type(ReleaseDateType::Hdced4Plus)
        || offender.is_active_sex_offender
        || sentence.offence.is_schedule_15
        || sentence.is_dto()
        || sentence.has_sds_plus_component()
        || sentence.is_recall()
    {
        return None;
    }
    let start = sentence.sentenced_at;
    let minimum = config
        .minimum_custodial_period_days
        .max(config.minimum_days_on_hdc);
    if calculation.adjusted_release_date < add_days(start, minimum) {
        return None;
    }

    let custodial_period = calculation.number_of_days_to_release;
    let (offset, rule) = if custodial_period < config.custodial_period_mid_point_days {
        (
            config
                .custodial_period_below_midpoint_minimum_deduction_days
                .max(Fraction::HALF.ceil_of(custodial_period)),
            CalculationRule::Hdced4PlusGeMinPeriodLtMidpoint,
        )
    } else {
        (
            custodial_period - config.custodial_period_above_midpoint_deduction_days - 1,
            CalculationRule::Hdced4PlusGeMidpoint,
        )
    };

    let unadjusted = add_days(start, offset);
    let adjusted_days = calculation.adjusted_days();
    let date = add_days(unadjusted, adjusted_days);
    let earliest = add_days(start, config.minimum_custodial_period_days);

    if date < earliest {
        return Some(
            DateBreakdown::new(unadjusted, (earliest - unadjusted).num_days(), earliest)
                .with_rule(rule)
                .with_rule(CalculationRule::Hdced4PlusMinimumCustodialPeriod),
        );
    }
    Some(DateBreakdown::new(unadjusted, adjusted_days, date).with_rule(rule))
}
