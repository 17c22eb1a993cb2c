//! End-to-end booking calculations

use crate::common::*;
use engine::calculate_booking;
use engine::calculation::working_days::{adjust_for_working_days, EnglandAndWalesBankHolidays};
use pretty_assertions::assert_eq;
use shared_types::{
    Adjustment, AdjustmentType, Adjustments, Booking, CalculationConfig, CalculationError,
    CalculationErrorKind, CalculationOptions, CalculationOutcome, DateRange, Duration,
    EffectiveSentenceLength, Fraction, RecallType, ReleaseDateType,
};
use std::collections::BTreeMap;
use uuid::Uuid;

use ReleaseDateType::*;

fn run(booking: &Booking) -> Result<CalculationOutcome, CalculationError> {
    calculate_booking(booking, &CalculationOptions::default(), &config())
}

#[test]
fn single_four_year_sentence() {
    let sentence = sds(date(2022, 1, 1), Duration::years(4));
    let outcome = run(&booking(vec![sentence.clone()])).unwrap();

    assert_eq!(
        outcome.result.dates,
        BTreeMap::from([(Sled, date(2025, 12, 31)), (Crd, date(2024, 1, 1))])
    );
    assert_eq!(
        outcome.result.effective_sentence_length,
        EffectiveSentenceLength {
            years: 4,
            months: 0,
            days: 0,
        }
    );
    assert_eq!(outcome.result.sentences_impacting_final_release_date, vec![sentence.id]);
    assert!(outcome.sentence(sentence.id).is_some());
    assert!(!outcome.release_occurred);
}

#[test]
fn concurrent_short_sentences() {
    let six_months = sds(date(2022, 1, 1), Duration::months(6));
    let three_months = sds(date(2022, 1, 1), Duration::months(3));
    let outcome = run(&booking(vec![six_months.clone(), three_months])).unwrap();

    assert_eq!(
        outcome.result.dates,
        BTreeMap::from([
            (Sled, date(2022, 6, 30)),
            (Crd, date(2022, 4, 1)),
            (Hdced, date(2022, 2, 16)),
            (Tused, date(2023, 4, 1)),
        ])
    );
    assert_eq!(
        outcome.result.effective_sentence_length,
        EffectiveSentenceLength {
            years: 0,
            months: 6,
            days: 0,
        }
    );
    assert_eq!(outcome.result.sentences_impacting_final_release_date, vec![six_months.id]);
    assert_eq!(outcome.groups.len(), 1);
}

#[test]
fn consecutive_sentences_are_calculated_as_one_term() {
    let first = sds(date(2022, 1, 1), Duration::years(1));
    let second = sds(date(2022, 1, 1), Duration::years(1)).consecutive_to(first.id);
    let outcome = run(&booking(vec![first.clone(), second.clone()])).unwrap();

    assert_eq!(outcome.sentences.len(), 1);
    assert_eq!(outcome.result.date(Crd), Some(date(2022, 12, 31)));
    assert_eq!(outcome.result.date(Sled), Some(date(2023, 12, 31)));
    assert_eq!(outcome.result.date(Hdced), Some(date(2022, 7, 5)));
    assert_eq!(outcome.result.date(Tused), None);
    assert_eq!(
        outcome.result.sentences_impacting_final_release_date,
        vec![first.id, second.id]
    );
    assert_eq!(outcome.result.effective_sentence_length.years, 2);
}

#[test]
fn booking_remand_is_deducted() {
    let start = date(2022, 1, 1);
    let booking = booking(vec![sds(start, Duration::years(4))]).with_adjustments(remand(30, start));
    let outcome = run(&booking).unwrap();
    assert_eq!(outcome.result.date(Crd), Some(date(2023, 12, 2)));
    assert_eq!(outcome.result.date(Sled), Some(date(2025, 12, 1)));
    assert_eq!(outcome.result.breakdown_by_release_date_type[&Crd].adjusted_days, -30);
}

#[test]
fn only_the_current_custodial_period_is_reported() {
    let first = sds(date(2022, 1, 1), Duration::days(304));
    let second = sds(date(2022, 9, 1), Duration::months(6));
    let outcome = run(&booking(vec![first, second.clone()])).unwrap();

    assert!(outcome.release_occurred);
    assert_eq!(outcome.groups.len(), 2);
    assert_eq!(outcome.result.date(Crd), Some(date(2022, 11, 30)));
    assert_eq!(outcome.result.date(Sled), Some(date(2023, 2, 28)));
    assert_eq!(outcome.result.sentences_impacting_final_release_date, vec![second.id]);
}

#[test]
fn fixed_term_recall_release() {
    let recall = sds(date(2022, 1, 1), Duration::years(2)).recalled(RecallType::FixedTermRecall);
    let booking = booking(vec![recall]).with_return_to_custody_date(date(2022, 6, 10));
    let outcome = run(&booking).unwrap();
    assert_eq!(outcome.result.date(Prrd), Some(date(2022, 7, 7)));
    assert_eq!(outcome.result.date(Hdced), None);
}

#[test]
fn fixed_term_recall_without_return_to_custody_date() {
    let recall = sds(date(2022, 1, 1), Duration::years(2)).recalled(RecallType::FixedTermRecall);
    let error = run(&booking(vec![recall.clone()])).unwrap_err();
    assert_eq!(
        error,
        CalculationError::MissingReturnToCustodyDate {
            sentence_id: recall.id,
        }
    );
}

#[test]
fn optional_dates_are_calculated_when_requested() {
    let options = CalculationOptions::default().with_ersed().with_hdced4plus();
    let outcome = calculate_booking(
        &booking(vec![sds(date(2022, 1, 1), Duration::years(4))]),
        &options,
        &config(),
    )
    .unwrap();
    assert_eq!(outcome.result.date(Ersed), Some(date(2023, 1, 1)));
    assert_eq!(outcome.result.date(Hdced4Plus), Some(date(2023, 7, 6)));
}

#[test]
fn overlapping_remand_is_rejected() {
    let start = date(2022, 1, 1);
    let adjustments = Adjustments::new()
        .with(
            AdjustmentType::Remand,
            Adjustment::for_period(date(2021, 1, 1), date(2021, 3, 1), start),
        )
        .with(
            AdjustmentType::Remand,
            Adjustment::for_period(date(2021, 2, 1), date(2021, 4, 1), start),
        );
    let booking = booking(vec![sds(start, Duration::years(4))]).with_adjustments(adjustments);
    let error = run(&booking).unwrap_err();
    assert_eq!(error.kind(), CalculationErrorKind::InvalidData);
}

#[test]
fn overlapping_remand_is_reported_before_it_can_swamp_the_sentence() {
    let start = date(2021, 5, 1);
    let adjustments = Adjustments::new()
        .with(
            AdjustmentType::Remand,
            Adjustment::for_period(date(2021, 1, 1), date(2021, 3, 1), start),
        )
        .with(
            AdjustmentType::Remand,
            Adjustment::for_period(date(2021, 2, 1), date(2021, 4, 1), start),
        );
    let booking = booking(vec![sds(start, Duration::months(6))]).with_adjustments(adjustments);

    let error = run(&booking).unwrap_err();
    assert_eq!(
        error,
        CalculationError::RemandOverlapsRemand {
            first: DateRange::new(date(2021, 1, 1), date(2021, 3, 1)),
            second: DateRange::new(date(2021, 2, 1), date(2021, 4, 1)),
        }
    );
    assert_eq!(error.kind(), CalculationErrorKind::InvalidData);
}

#[test]
fn new_sentence_after_release_from_a_recall() {
    let recall = sds(date(2019, 1, 1), Duration::years(1)).recalled(RecallType::StandardRecall);
    let fresh = sds(date(2023, 1, 1), Duration::months(6));
    let outcome = run(&booking(vec![recall, fresh.clone()])).unwrap();

    assert!(outcome.release_occurred);
    assert_eq!(outcome.groups.len(), 2);
    assert!(outcome.groups[1].follows_release);
    assert_eq!(outcome.result.date(Crd), Some(date(2023, 4, 1)));
    assert_eq!(outcome.result.date(Sled), Some(date(2023, 6, 30)));
    assert_eq!(outcome.result.sentences_impacting_final_release_date, vec![fresh.id]);
}

#[test]
fn new_sentence_served_during_a_recall() {
    let recall = sds(date(2020, 1, 1), Duration::years(2)).recalled(RecallType::StandardRecall);
    let fresh = sds(date(2021, 6, 1), Duration::months(6));
    let outcome = run(&booking(vec![recall, fresh.clone()])).unwrap();

    assert!(!outcome.release_occurred);
    assert_eq!(outcome.result.date(Crd), Some(date(2021, 8, 31)));
    assert_eq!(outcome.result.date(Sled), Some(date(2021, 12, 31)));
    assert_eq!(outcome.result.date(Prrd), Some(date(2021, 12, 31)));
    assert_eq!(outcome.result.sentences_impacting_final_release_date, vec![fresh.id]);
}

#[test]
fn term_beyond_the_calendar_is_unsupported() {
    let sentence = sds(date(2022, 1, 1), Duration::years(300_000));
    let error = run(&booking(vec![sentence.clone()])).unwrap_err();
    assert!(matches!(error, CalculationError::UnsupportedSentence { sentence_id, .. } if sentence_id == sentence.id));
    assert_eq!(error.kind(), CalculationErrorKind::UnsupportedInput);
}

#[test]
fn empty_booking_is_rejected() {
    assert_eq!(run(&booking(vec![])).unwrap_err(), CalculationError::NoSentences);
}

#[test]
fn unknown_consecutive_reference_is_rejected() {
    let missing = Uuid::new_v4();
    let sentence = sds(date(2022, 1, 1), Duration::years(1)).consecutive_to(missing);
    assert_eq!(
        run(&booking(vec![sentence.clone()])).unwrap_err(),
        CalculationError::UnknownConsecutiveReference {
            sentence_id: sentence.id,
            reference: missing,
        }
    );
}

#[test]
fn dto_cannot_follow_an_adult_sentence() {
    let adult = sds(date(2022, 1, 1), Duration::years(1));
    let youth = dto(date(2022, 1, 1), Duration::months(4)).consecutive_to(adult.id);
    assert_eq!(
        run(&booking(vec![adult.clone(), youth.clone()])).unwrap_err(),
        CalculationError::DtoConsecutiveToNonDto {
            sentence_id: youth.id,
            other_id: adult.id,
        }
    );
}

#[test]
fn consecutive_cycle_is_rejected() {
    let first = sds(date(2022, 1, 1), Duration::years(1));
    let second = sds(date(2022, 1, 1), Duration::years(1)).consecutive_to(first.id);
    let first = first.consecutive_to(second.id);

    let error = run(&booking(vec![first.clone(), second])).unwrap_err();
    assert_eq!(error, CalculationError::ConsecutiveCycle { sentence_id: first.id });
    assert_eq!(error.kind(), CalculationErrorKind::UnsupportedInput);
}

#[test]
fn invalid_configuration_is_rejected_before_calculating() {
    let mut config = CalculationConfig::default();
    config.ersed.release_point = Fraction::new(3, 2);
    let error = calculate_booking(
        &booking(vec![sds(date(2022, 1, 1), Duration::years(4))]),
        &CalculationOptions::default(),
        &config,
    )
    .unwrap_err();
    assert_eq!(error.kind(), CalculationErrorKind::Configuration);
}

#[test]
fn release_on_new_years_day_moves_to_the_last_working_day() {
    let outcome = run(&booking(vec![sds(date(2022, 1, 1), Duration::years(4))])).unwrap();
    let moved = adjust_for_working_days(&outcome.result, &EnglandAndWalesBankHolidays::default());
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].release_date_type, Crd);
    assert_eq!(moved[0].adjusted_date, date(2023, 12, 29));
}

#[test]
fn result_serializes_with_date_type_codes() {
    let outcome = run(&booking(vec![sds(date(2022, 1, 1), Duration::years(4))])).unwrap();
    let json = serde_json::to_value(&outcome.result).unwrap();
    assert_eq!(json["dates"]["CRD"], "2024-01-01");
    assert_eq!(json["dates"]["SLED"], "2025-12-31");
    assert_eq!(json["effective_sentence_length"]["years"], 4);
}
