//! Booking-level extraction of the dates still being served

use crate::common::*;
use engine::calculation::extraction::{effective_sentence_length, extract};
use engine::calculation::timeline::walk_timeline;
use pretty_assertions::assert_eq;
use shared_types::{
    Adjustments, CalculatedSentence, CalculationError, CalculationErrorKind, CalculationResult,
    Duration, EffectiveSentenceLength, RecallType, ReleaseDateType,
};

fn walk_and_extract(sentences: Vec<CalculatedSentence>) -> Result<CalculationResult, CalculationError> {
    let outcome = walk_timeline(sentences, &Adjustments::new(), &config()).unwrap();
    extract(&outcome.sentences, &outcome.groups)
}

fn length(years: u32, months: u32, days: u32) -> EffectiveSentenceLength {
    EffectiveSentenceLength {
        years,
        months,
        days,
    }
}

#[test]
fn single_sentence_is_copied_across() {
    let calculated = calculate(&sds(date(2022, 1, 1), Duration::years(4)));
    let id = calculated.id();
    let result = walk_and_extract(vec![calculated]).unwrap();

    assert_eq!(result.dates.len(), 2);
    assert_eq!(result.date(ReleaseDateType::Crd), Some(date(2024, 1, 1)));
    assert_eq!(result.date(ReleaseDateType::Sled), Some(date(2025, 12, 31)));
    assert_eq!(result.effective_sentence_length, length(4, 0, 0));
    assert_eq!(result.sentences_impacting_final_release_date, vec![id]);
}

#[test]
fn concurrent_sentences_take_the_latest_dates() {
    let six_months = calculate(&sds(date(2022, 1, 1), Duration::months(6)));
    let three_months = calculate(&sds(date(2022, 1, 1), Duration::months(3)));
    let id = six_months.id();

    let result = walk_and_extract(vec![three_months, six_months]).unwrap();
    assert_eq!(result.date(ReleaseDateType::Crd), Some(date(2022, 4, 1)));
    assert_eq!(result.date(ReleaseDateType::Sled), Some(date(2022, 6, 30)));
    assert_eq!(result.effective_sentence_length, length(0, 6, 0));
    assert_eq!(result.sentences_impacting_final_release_date, vec![id]);
}

#[test]
fn only_sentences_after_the_last_release_are_extracted() {
    let first = calculate(&sds(date(2022, 1, 1), Duration::days(304)));
    let second = calculate(&sds(date(2022, 9, 1), Duration::months(6)));
    let id = second.id();

    let result = walk_and_extract(vec![first, second]).unwrap();
    assert_eq!(result.date(ReleaseDateType::Crd), Some(date(2022, 11, 30)));
    assert_eq!(result.date(ReleaseDateType::Sled), Some(date(2023, 2, 28)));
    assert_eq!(result.sentences_impacting_final_release_date, vec![id]);
}

#[test]
fn new_sentence_inside_a_recall_is_served_alongside_it() {
    let recall = calculate(&sds(date(2020, 1, 1), Duration::years(2)).recalled(RecallType::StandardRecall));
    let fresh = calculate(&sds(date(2021, 6, 1), Duration::months(6)));
    let fresh_id = fresh.id();

    let result = walk_and_extract(vec![recall, fresh]).unwrap();
    assert_eq!(result.date(ReleaseDateType::Crd), Some(date(2021, 8, 31)));
    assert_eq!(result.date(ReleaseDateType::Sled), Some(date(2021, 12, 31)));
    assert_eq!(result.sentences_impacting_final_release_date, vec![fresh_id]);
}

#[test]
fn sentences_served_apart_without_a_release_are_ambiguous() {
    let first = calculate(&sds(date(2022, 1, 1), Duration::months(6)));
    let second = calculate(&sds(date(2022, 5, 1), Duration::months(6)));
    let first_range = first.custodial_range();
    let second_range = second.custodial_range();
    assert!(!first_range.overlaps(&second_range));

    let error = extract(&[first, second], &[]).unwrap_err();
    assert!(matches!(error, CalculationError::SentencesDoNotOverlap { ref sentence_ids } if sentence_ids.len() == 2));
    assert_eq!(error.kind(), CalculationErrorKind::ExtractionAmbiguity);
}

#[test]
fn all_dtos_release_at_mid_term() {
    let first = calculate(&dto(date(2022, 1, 1), Duration::months(8)));
    let second = calculate(&dto(date(2022, 1, 1), Duration::months(4)));
    let result = walk_and_extract(vec![first, second]).unwrap();
    assert_eq!(result.date(ReleaseDateType::Mtd), Some(date(2022, 5, 2)));
    assert_eq!(result.date(ReleaseDateType::Sed), Some(date(2022, 8, 31)));
    assert_eq!(result.date(ReleaseDateType::Crd), None);
}

#[test]
fn effective_length_is_an_inclusive_calendar_period() {
    assert_eq!(effective_sentence_length(date(2022, 1, 1), date(2022, 6, 30)), length(0, 6, 0));
    assert_eq!(effective_sentence_length(date(2022, 1, 1), date(2025, 12, 31)), length(4, 0, 0));
    assert_eq!(effective_sentence_length(date(2022, 1, 1), date(2022, 2, 14)), length(0, 1, 14));
    assert_eq!(effective_sentence_length(date(2022, 1, 1), date(2022, 1, 1)), length(0, 0, 1));
    assert_eq!(effective_sentence_length(date(2022, 1, 31), date(2022, 3, 30)), length(0, 2, 0));
}

#[test]
fn effective_length_is_zero_when_expiry_precedes_start() {
    assert_eq!(
        effective_sentence_length(date(2022, 1, 1), date(2021, 12, 30)),
        EffectiveSentenceLength::default()
    );
}
