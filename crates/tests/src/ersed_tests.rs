use crate::common::*;
use engine::calculation::ersed::calculate_ersed;
use pretty_assertions::assert_eq;
use shared_types::{
    CalculatedSentence, CalculationOptions, CalculationRule, Duration, ErsedConfiguration,
    Sentence,
};

fn with_ersed(sentence: &Sentence, remand_days: i64) -> CalculatedSentence {
    let options = CalculationOptions::default().with_ersed();
    calculate_identified(
        identify_with(sentence, &options),
        &remand(remand_days, sentence.sentenced_at),
    )
}

#[test]
fn half_the_custodial_period_when_later_than_max_period() {
    let calculated = with_ersed(&sds(date(2022, 1, 1), Duration::years(4)), 0);
    let breakdown =
        calculate_ersed(&calculated.sentence, &calculated.calculation, &ErsedConfiguration::default())
            .unwrap();
    assert_eq!(breakdown.release_date, date(2023, 1, 1));
    assert!(breakdown.has_rule(CalculationRule::ErsedOneHalfCustodialPeriod));
}

#[test]
fn long_sentences_use_the_max_removal_period() {
    let calculated = with_ersed(&sds(date(2022, 1, 1), Duration::years(10)), 0);
    let breakdown =
        calculate_ersed(&calculated.sentence, &calculated.calculation, &ErsedConfiguration::default())
            .unwrap();
    // 1826 days to release less 544
    assert_eq!(breakdown.release_date, date(2025, 7, 5));
    assert!(breakdown.has_rule(CalculationRule::ErsedMaxPeriod));
}

#[test]
fn never_before_the_sentence_date() {
    let calculated = with_ersed(&sds(date(2022, 1, 1), Duration::years(4)), 400);
    let breakdown =
        calculate_ersed(&calculated.sentence, &calculated.calculation, &ErsedConfiguration::default())
            .unwrap();
    assert_eq!(breakdown.release_date, date(2022, 1, 1));
    assert_eq!(breakdown.adjusted_days, -365);
    assert!(breakdown.has_rule(CalculationRule::ErsedBeforeSentenceDate));
}

#[test]
fn not_calculated_without_the_option() {
    let calculated = calculate(&sds(date(2022, 1, 1), Duration::years(4)));
    assert!(
        calculate_ersed(&calculated.sentence, &calculated.calculation, &ErsedConfiguration::default())
            .is_none()
    );
}

#[test]
fn dtos_have_no_ersed() {
    let calculated = with_ersed(&dto(date(2022, 1, 1), Duration::months(8)), 0);
    assert!(
        calculate_ersed(&calculated.sentence, &calculated.calculation, &ErsedConfiguration::default())
            .is_none()
    );
}
