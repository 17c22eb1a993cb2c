//! Booking calculation: 7-stage pipeline
//!
//! 1. Validates sentences, consecutive links and remand periods
//! 2. Identifies each sentence's track and release date types
//! 3. Builds consecutive chains and any single term
//! 4. Calculates every extractable sentence on its own adjustment window
//! 5. Walks the timeline, reallocating adjustments group by group
//! 6. Runs the eligibility calculators and the remand against custody check
//! 7. Extracts the booking-level dates

use shared_types::{
    AdjustmentWindow, Booking, CalculatedSentence, CalculationConfig, CalculationError,
    CalculationOptions, CalculationOutcome, Offender, ReleaseDateType, Sentence, SentenceKind,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use uuid::Uuid;

use super::consecutive::build_consecutive_sentences;
use super::duration_aggregator::{custodial_days, DurationAggregator};
use super::ersed::calculate_ersed;
use super::extraction::extract;
use super::hdced::calculate_hdced;
use super::hdced4plus::calculate_hdced4plus;
use super::identification::identify_sentence;
use super::recall::calculate_prrd;
use super::remand_overlap::{check_remand_overlaps_custody, check_remand_overlaps_remand};
use super::sentence_calculation::calculate_sentence;
use super::single_term::build_single_term;
use super::timeline::walk_timeline;
use super::tused::calculate_tused;

#[tracing::instrument(skip_all, fields(offender = %booking.offender.reference, sentences = booking.sentences.len()))]
pub fn calculate_booking(
    booking: &Booking,
    options: &CalculationOptions,
    config: &CalculationConfig,
) -> Result<CalculationOutcome, CalculationError> {
    config.validate()?;
    validate_sentences(&booking.sentences)?;
    check_remand_overlaps_remand(&booking.adjustments)?;

    let identified = identify_all(&booking.sentences, &booking.offender, options, config)?;
    let extractable = extractable_sentences(identified, &booking.offender, options, config)?;

    let calculated = extractable
        .into_iter()
        .map(|sentence| {
            let window = AdjustmentWindow::for_sentence(sentence.sentenced_at);
            let calculation = calculate_sentence(&sentence, &booking.adjustments, window, config)?;
            Ok(CalculatedSentence::new(sentence, calculation))
        })
        .collect::<Result<Vec<_>, CalculationError>>()?;

    let timeline = walk_timeline(calculated, &booking.adjustments, config)?;

    let sentences = timeline
        .sentences
        .into_iter()
        .map(|sentence| with_eligibility_dates(sentence, booking, config))
        .collect::<Result<Vec<_>, CalculationError>>()?;

    check_remand_overlaps_custody(&booking.adjustments, &sentences)?;
    let result = extract(&sentences, &timeline.groups)?;

    tracing::info!(
        dates = ?result.dates,
        groups = timeline.groups.len(),
        release_occurred = timeline.release_occurred,
        "booking calculated"
    );
    Ok(CalculationOutcome {
        result,
        sentences,
        groups: timeline.groups,
        adjustments: timeline.adjustments,
        release_occurred: timeline.release_occurred,
    })
}

// ── Validation ──────────────────────────────────────────────────────

fn validate_sentences(sentences: &[Sentence]) -> Result<(), CalculationError> {
    if sentences.is_empty() {
        return Err(CalculationError::NoSentences);
    }
    let by_id: BTreeMap<Uuid, &Sentence> = sentences.iter().map(|s| (s.id, s)).collect();

    for sentence in sentences {
        if matches!(
            sentence.kind,
            SentenceKind::Consecutive { .. } | SentenceKind::SingleTerm { .. }
        ) {
            return Err(CalculationError::unsupported(
                sentence.id,
                "aggregate sentences cannot be supplied as input",
            ));
        }
        let term = DurationAggregator::aggregate(&sentence.total_durations());
        if term.checked_end_date(sentence.sentenced_at).is_none() {
            return Err(CalculationError::unsupported(
                sentence.id,
                "sentence term runs past the supported calendar",
            ));
        }
        if custodial_days(sentence) <= 0 {
            return Err(CalculationError::unsupported(sentence.id, "sentence has no custodial term"));
        }
        for reference in &sentence.consecutive_to {
            let other = by_id.get(reference).ok_or(CalculationError::UnknownConsecutiveReference {
                sentence_id: sentence.id,
                reference: *reference,
            })?;
            if sentence.is_dto() != other.is_dto() {
                return Err(CalculationError::DtoConsecutiveToNonDto {
                    sentence_id: sentence.id,
                    other_id: other.id,
                });
            }
        }
    }

    let mut finished = HashSet::new();
    for sentence in sentences {
        let mut path = BTreeSet::new();
        check_cycle(sentence, &by_id, &mut path, &mut finished)?;
    }
    Ok(())
}

/// Depth-first walk back along `consecutive_to`; revisiting a sentence on
/// the current path is a cycle.
fn check_cycle(
    sentence: &Sentence,
    by_id: &BTreeMap<Uuid, &Sentence>,
    path: &mut BTreeSet<Uuid>,
    finished: &mut HashSet<Uuid>,
) -> Result<(), CalculationError> {
    if finished.contains(&sentence.id) {
        return Ok(());
    }
    if !path.insert(sentence.id) {
        return Err(CalculationError::ConsecutiveCycle {
            sentence_id: sentence.id,
        });
    }
    for reference in &sentence.consecutive_to {
        if let Some(predecessor) = by_id.get(reference) {
            check_cycle(predecessor, by_id, path, finished)?;
        }
    }
    path.remove(&sentence.id);
    finished.insert(sentence.id);
    Ok(())
}

// ── Identification and aggregation ──────────────────────────────────

fn identify_all(
    sentences: &[Sentence],
    offender: &Offender,
    options: &CalculationOptions,
    config: &CalculationConfig,
) -> Result<Vec<Sentence>, CalculationError> {
    sentences
        .iter()
        .map(|sentence| {
            let identification = identify_sentence(sentence, offender, options, &config.release_points)?;
            Ok(sentence.identified(identification))
        })
        .collect()
}

/// The sentences that go forward to calculation: a single term when one is
/// required, otherwise every consecutive chain plus the sentences no chain
/// absorbed.
fn extractable_sentences(
    identified: Vec<Sentence>,
    offender: &Offender,
    options: &CalculationOptions,
    config: &CalculationConfig,
) -> Result<Vec<Sentence>, CalculationError> {
    if let Some(single_term) = build_single_term(&identified) {
        let identification = identify_sentence(&single_term, offender, options, &config.release_points)?;
        return Ok(vec![single_term.identified(identification)]);
    }

    let chains = build_consecutive_sentences(&identified, offender, options, &config.release_points)?;
    let absorbed: HashSet<Uuid> = chains.iter().flat_map(Sentence::source_ids).collect();
    let mut extractable = chains;
    extractable.extend(identified.into_iter().filter(|s| !absorbed.contains(&s.id)));
    Ok(extractable)
}

// ── Eligibility dates ───────────────────────────────────────────────

fn with_eligibility_dates(
    mut calculated: CalculatedSentence,
    booking: &Booking,
    config: &CalculationConfig,
) -> Result<CalculatedSentence, CalculationError> {
    let sentence = &calculated.sentence;
    let calculation = &mut calculated.calculation;

    let dates = [
        (
            ReleaseDateType::Hdced,
            calculate_hdced(sentence, calculation, &booking.offender, &config.hdced),
        ),
        (
            ReleaseDateType::Hdced4Plus,
            calculate_hdced4plus(sentence, calculation, &booking.offender, &config.hdced4plus),
        ),
        (ReleaseDateType::Ersed, calculate_ersed(sentence, calculation, &config.ersed)),
        (ReleaseDateType::Tused, calculate_tused(sentence, calculation, &config.tused)),
        (
            ReleaseDateType::Prrd,
            calculate_prrd(
                sentence,
                calculation,
                booking.return_to_custody_date,
                &config.fixed_term_recall,
            )?,
        ),
    ];

    for (release_date_type, breakdown) in dates {
        match breakdown {
            Some(breakdown) => calculation.set_date(release_date_type, breakdown),
            None => calculation.remove_date(release_date_type),
        }
    }
    Ok(calculated)
}
