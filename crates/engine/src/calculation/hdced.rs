//! Home detention curfew eligibility date (HDCED)
//!
//! Measured on the historic custodial period (the release point before any
//! early-release scheme):
//! - below the midpoint: eligible after half the custodial period, but not
//!   before the minimum deduction;
//! - at or above the midpoint: a fixed number of days before release.
//!
//! The result never falls before the minimum days on HDC.

use shared_types::{
    add_days, CalculationRule, DateBreakdown, Fraction, HdcedConfiguration, Offender,
    ReleaseDateType, Sentence, SentenceCalculation,
};

pub fn calculate_hdced(
    sentence: &Sentence,
    calculation: &SentenceCalculation,
    offender: &Offender,
    config: &HdcedConfiguration,
) -> Option<DateBreakdown> {
    if !is_eligible(sentence, calculation, offender, config) {
        return None;
    }

    let start = sentence.sentenced_at;
    let custodial_period = calculation.historic_release_days;
    let (offset, rule) = if custodial_period < config.custodial_period_mid_point_days {
        (
            config
                .custodial_period_below_midpoint_minimum_deduction_days
                .max(Fraction::HALF.ceil_of(custodial_period)),
            CalculationRule::HdcedGeMinPeriodLtMidpoint,
        )
    } else {
        (
            custodial_period - config.custodial_period_above_midpoint_deduction_days - 1,
            CalculationRule::HdcedGeMidpointLtMaxPeriod,
        )
    };

    let unadjusted = add_days(start, offset);
    let adjusted_days = calculation.adjusted_days();
    let date = add_days(unadjusted, adjusted_days);
    let earliest = add_days(start, config.minimum_days_on_hdc);

    let breakdown = if date < earliest {
        DateBreakdown::new(unadjusted, (earliest - unadjusted).num_days(), earliest)
            .with_rule(rule)
            .with_rule(CalculationRule::HdcedMinimumCustodialPeriod)
    } else {
        DateBreakdown::new(unadjusted, adjusted_days, date).with_rule(rule)
    };
    tracing::debug!(sentence = %sentence.id, hdced = %breakdown.release_date, ?rule, "hdced calculated");
    Some(breakdown)
}

fn is_eligible(
    sentence: &Sentence,
    calculation: &SentenceCalculation,
    offender: &Offender,
    config: &HdcedConfiguration,
) -> bool {
    if !sentence.has_release_date_type(ReleaseDateType::Hdced)
        || offender.is_active_sex_offender
        || sentence.is_dto()
        || sentence.has_sds_plus_component()
        || sentence.is_recall()
    {
        return false;
    }
    let minimum = config
        .minimum_custodial_period_days
        .max(config.minimum_days_on_hdc);
    calculation.adjusted_release_date >= add_days(sentence.sentenced_at, minimum)
}
