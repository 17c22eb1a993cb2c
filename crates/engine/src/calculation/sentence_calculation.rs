//! Per-sentence date calculation
//!
//! Derives the unadjusted release and expiry points from an identified
//! sentence, then applies the adjustments that fall inside the supplied
//! attribution window. Every call builds a fresh [`SentenceCalculation`];
//! recalculating under a different window never reuses earlier figures.

use chrono::NaiveDate;
use shared_types::{
    add_days, AdjustmentWindow, Adjustments, CalculationConfig, CalculationError,
    CalculationRule, DateBreakdown, Duration, Fraction, IdentificationTrack, ReleaseDateType,
    ReleasePointMultipliers, Sentence, SentenceCalculation, SentenceIdentification, SentenceKind,
};
use std::collections::BTreeMap;

use super::duration_aggregator::{custodial_days, sentence_days, DurationAggregator};
use super::identification::{track_parole_fraction, track_release_fraction};

/// Calculate a sentence under the given adjustment window.
#[tracing::instrument(skip_all, fields(sentence = %sentence.id, after = ?window.after, before = %window.before))]
pub fn calculate_sentence(
    sentence: &Sentence,
    adjustments: &Adjustments,
    window: AdjustmentWindow,
    config: &CalculationConfig,
) -> Result<SentenceCalculation, CalculationError> {
    let identification = identification_of(sentence)?;
    let multipliers = &config.release_points;
    let start = sentence.sentenced_at;

    let release_date_type = ReleaseDateType::RELEASE_TYPES
        .into_iter()
        .find(|t| identification.has(*t))
        .ok_or_else(|| CalculationError::unsupported(sentence.id, "no release point for sentence"))?;

    // ── Day offsets ──
    let expiry_days = sentence_days(sentence);
    let mut release_days = point_days(sentence, |s| release_fraction(s, multipliers))?;
    let historic_release_days = point_days(sentence, |s| historic_fraction(s, multipliers))?;

    let mut release_rules = Vec::new();
    match &sentence.kind {
        SentenceKind::Consecutive { .. } => release_rules.push(CalculationRule::ConsecutiveAggregate),
        SentenceKind::SingleTerm { .. } => release_rules.push(CalculationRule::SingleTermAggregate),
        _ => {}
    }
    if identification.track == IdentificationTrack::SdsEarlyRelease {
        if let Some((floor_days, rule)) = tranche_floor(sentence, config) {
            if release_days < floor_days {
                release_days = floor_days.min(historic_release_days);
                release_rules.push(rule);
            }
        }
    }

    let licence_days = if identification.has(ReleaseDateType::Led) {
        Some(multipliers.pre_cja_licence_expiry.ceil_of(custodial_days(sentence)))
    } else {
        None
    };
    let parole_days = if identification.has(ReleaseDateType::Ped) {
        Some(point_days(sentence, |s| parole_fraction(s, multipliers))?)
    } else {
        None
    };

    // ── Adjustments ──
    let deducted_days = adjustments.deducted_days(&window);
    let awarded_days = adjustments.awarded_days(&window);
    let unlawfully_at_large_days = adjustments.unlawfully_at_large_days(&window);
    let expiry_adjustment = unlawfully_at_large_days - deducted_days;

    let unadjusted_release_date = add_days(start, release_days - 1);
    let unadjusted_expiry_date = add_days(start, expiry_days - 1);
    let release_date_before_awarded = add_days(unadjusted_release_date, expiry_adjustment);
    if release_date_before_awarded < start {
        return Err(CalculationError::CustodialPeriodExtinguished {
            sentence_id: sentence.id,
            sentenced_at: start,
            release_date: release_date_before_awarded,
        });
    }
    let adjusted_release_date = add_days(release_date_before_awarded, awarded_days);
    let adjusted_expiry_date = add_days(unadjusted_expiry_date, expiry_adjustment);
    let adjusted_licence_expiry_date =
        licence_days.map(|days| add_days(start, days - 1 + expiry_adjustment));
    let adjusted_parole_eligibility_date =
        parole_days.map(|days| add_days(start, days - 1 + expiry_adjustment));

    let mut calculation = SentenceCalculation {
        sentence_id: sentence.id,
        window,
        number_of_days_to_sentence_expiry: expiry_days,
        number_of_days_to_release: release_days,
        historic_release_days,
        number_of_days_to_licence_expiry: licence_days,
        number_of_days_to_parole_eligibility: parole_days,
        deducted_days,
        awarded_days,
        unlawfully_at_large_days,
        release_date_type,
        unadjusted_release_date,
        unadjusted_expiry_date,
        release_date_before_awarded,
        adjusted_release_date,
        adjusted_expiry_date,
        adjusted_licence_expiry_date,
        adjusted_parole_eligibility_date,
        dates: BTreeMap::new(),
        breakdown: BTreeMap::new(),
    };

    // ── Dates ──
    let mut release_breakdown = DateBreakdown::new(
        unadjusted_release_date,
        calculation.adjusted_days(),
        adjusted_release_date,
    );
    for rule in release_rules {
        release_breakdown = release_breakdown.with_rule(rule);
    }
    calculation.set_date(release_date_type, release_breakdown);

    let expiry_breakdown =
        DateBreakdown::new(unadjusted_expiry_date, expiry_adjustment, adjusted_expiry_date);
    for expiry_type in [ReleaseDateType::Sled, ReleaseDateType::Sed] {
        if identification.has(expiry_type) {
            calculation.set_date(expiry_type, expiry_breakdown.clone());
        }
    }
    if let (Some(days), Some(date)) = (licence_days, adjusted_licence_expiry_date) {
        calculation.set_date(
            ReleaseDateType::Led,
            DateBreakdown::new(add_days(start, days - 1), expiry_adjustment, date),
        );
    }
    if let (Some(days), Some(date)) = (parole_days, adjusted_parole_eligibility_date) {
        calculation.set_date(
            ReleaseDateType::Ped,
            DateBreakdown::new(add_days(start, days - 1), expiry_adjustment, date),
        );
    }

    tracing::debug!(
        release_type = %release_date_type,
        release = %adjusted_release_date,
        expiry = %adjusted_expiry_date,
        deducted_days,
        awarded_days,
        "sentence calculated"
    );
    Ok(calculation)
}

fn identification_of(sentence: &Sentence) -> Result<&SentenceIdentification, CalculationError> {
    sentence
        .identification
        .as_ref()
        .ok_or(CalculationError::NotIdentified {
            sentence_id: sentence.id,
        })
}

/// Offset in days of a release point. Consecutive chains whose members
/// share a track take the fraction of the aggregate term; mixed-track
/// chains sum each member's own rounded point, walking a cursor through
/// the members.
fn point_days(
    sentence: &Sentence,
    fraction_for: impl Fn(&Sentence) -> Result<Fraction, CalculationError>,
) -> Result<i64, CalculationError> {
    match &sentence.kind {
        SentenceKind::Consecutive { sentences } if !shares_one_track(sentences) => {
            let mut cursor = sentence.sentenced_at;
            let mut total = 0;
            for member in sentences {
                let days =
                    DurationAggregator::aggregate(&member.custodial_durations()).calculate_days(cursor);
                total += fraction_for(member)?.ceil_of(days);
                cursor = add_days(cursor, days);
            }
            Ok(total)
        }
        _ => Ok(fraction_for(sentence)?.ceil_of(custodial_days(sentence))),
    }
}

fn shares_one_track(members: &[Sentence]) -> bool {
    let first = members.first().and_then(Sentence::track);
    members.iter().all(|m| m.track() == first)
}

fn release_fraction(
    sentence: &Sentence,
    multipliers: &ReleasePointMultipliers,
) -> Result<Fraction, CalculationError> {
    let identification = identification_of(sentence)?;
    if identification.track == IdentificationTrack::SdsBeforeCjaLaspo
        && identification.has(ReleaseDateType::Npd)
    {
        return Ok(multipliers.pre_cja_non_parole);
    }
    Ok(track_release_fraction(identification.track, multipliers))
}

/// Release fraction before the 40% scheme; used by HDC and ERS.
fn historic_fraction(
    sentence: &Sentence,
    multipliers: &ReleasePointMultipliers,
) -> Result<Fraction, CalculationError> {
    if sentence.track() == Some(IdentificationTrack::SdsEarlyRelease) {
        return Ok(multipliers.sds_standard_release);
    }
    release_fraction(sentence, multipliers)
}

/// PED fraction, or the release fraction for members without a PED.
fn parole_fraction(
    sentence: &Sentence,
    multipliers: &ReleasePointMultipliers,
) -> Result<Fraction, CalculationError> {
    let identification = identification_of(sentence)?;
    match track_parole_fraction(identification.track, multipliers) {
        Some(fraction) if identification.has(ReleaseDateType::Ped) => Ok(fraction),
        _ => release_fraction(sentence, multipliers),
    }
}

/// Earliest release offset allowed for an early-release sentence passed
/// before its tranche commenced.
fn tranche_floor(sentence: &Sentence, config: &CalculationConfig) -> Option<(i64, CalculationRule)> {
    let sds40 = &config.sds40;
    let start = sentence.sentenced_at;
    let tranche_two_days =
        Duration::years(sds40.tranche_two_minimum_duration_years).length_in_days(start);
    let (commencement, rule): (NaiveDate, CalculationRule) = if custodial_days(sentence) >= tranche_two_days {
        (sds40.tranche_two_commencement, CalculationRule::Sds40TrancheTwoCommencement)
    } else {
        (sds40.tranche_one_commencement, CalculationRule::Sds40TrancheOneCommencement)
    };
    if start >= commencement {
        return None;
    }
    Some(((commencement - start).num_days() + 1, rule))
}
